//! [Ultimate Tic-Tac-Toe] engine driven by a generic [Monte Carlo Tree
//! Search] implementation.
//!
//! The search in [`mcts`] knows nothing about the rules of any particular
//! game: it only relies on the capabilities described in [`environment`].
//! [`game`] provides the concrete rules and [`Engine`] puts everything together
//! into an interactive session.
//!
//! [Ultimate Tic-Tac-Toe]: https://en.wikipedia.org/wiki/Ultimate_tic-tac-toe
//! [Monte Carlo Tree Search]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search

// TODO: Gradually move most of warnings to deny.
#![warn(missing_docs, variant_size_differences)]
// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]
// Rustdoc lints.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
// Performance is extremely important.
#![deny(clippy::perf)]

pub mod environment;
pub mod game;
pub mod mcts;
pub mod util;

mod engine;
pub use engine::{Config, Engine, Mode};
use shadow_rs::shadow;

shadow!(build);

/// Target features relevant for the board representation. Produced by
/// `build.rs`.
const FEATURES: &str = include_str!(concat!(env!("OUT_DIR"), "/features"));

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints informations about the engine version on startup.
pub fn print_engine_info() {
    println!("uttt engine {}", engine_version());
}

/// Prints information the build type, features and whether the build is clean.
pub fn print_binary_info() {
    println!("Release build: {}", !shadow_rs::is_debug());
    println!("Features: {FEATURES}");
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
