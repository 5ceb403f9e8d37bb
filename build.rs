use shadow_rs::ShadowBuilder;

fn main() {
    // Git and build metadata for `deposit-rs --version`.
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
