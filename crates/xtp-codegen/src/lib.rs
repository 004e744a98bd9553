//! Code generation for XTP extension plugins.
//!
//! `xtp-codegen` reads an extension plugin schema (YAML) and generates the
//! types, codecs, round-trip tests, wasm entry points and host function
//! bindings a plugin author needs, for several target languages.
//!
//! # Architecture
//!
//! ```text
//! YAML            Model          Resolved            Backends
//! ──────     ─────────────     ──────────────     ─────────────────
//! v0     ─┐                                     ┌─> Go (nilable *T)
//!         ├─> Schema ─────> ResolvedSchema ─────┤
//! v1     ─┘   (ir.rs)       (resolve.rs)        └─> MoonBit (T?)
//! ```
//!
//! # Example
//!
//! ```
//! use xtp_codegen::{GenerateOptions, backend, generate, parse_schema, resolve};
//!
//! let yaml = r#"
//! version: v1-draft
//! exports:
//!   - name: greet
//!     input:
//!       type: string
//!       contentType: text/plain; charset=utf-8
//!     output:
//!       type: string
//!       contentType: text/plain; charset=utf-8
//! "#;
//!
//! let schema = parse_schema(yaml).unwrap();
//! let resolved = resolve(&schema).unwrap();
//! let go = backend("go").unwrap();
//! let artifacts = generate(&resolved, go, &GenerateOptions::default()).unwrap();
//! assert!(artifacts["main.go"].contents.contains("func Greet(input string) string"));
//! ```
//!
//! # Feature Flags
//!
//! Backend flags (use `backend-*` prefix):
//! - `backend-go` - Go types, tests and TinyGo plugin glue
//! - `backend-moonbit` - MoonBit types, tests and plugin glue
//!
//! Language umbrella flags: `go`, `moonbit` (alias `mbt`).

pub mod input;
pub mod ir;
pub mod output;
pub mod registry;
pub mod resolve;
pub mod traits;
pub mod write;

pub use input::{ParseError, parse_schema};
pub use output::{
    Artifact, ArtifactFamily, ArtifactSet, GenerateOptions, GenerationError, Layout, generate,
};
pub use registry::{UnsupportedTarget, backend, backend_names, backends};
pub use resolve::{ResolutionError, ResolvedSchema, resolve};
pub use traits::{Backend, IdentKind, TypeMapper, UnsupportedNodeError};
pub use write::{WriteConflict, WriteError, WriteOptions, WriteReport, write_artifacts};
