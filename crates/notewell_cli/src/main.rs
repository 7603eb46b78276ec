//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notewell_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("notewell_core version={}", notewell_core::core_version());
    println!(
        "notewell_core default_log_level={}",
        notewell_core::default_log_level()
    );
}
