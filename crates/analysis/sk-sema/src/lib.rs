//! Semantic analysis core for the shrike SystemVerilog front end
//!
//! After parsing produces a syntax tree, this crate builds the hierarchical
//! symbol graph, performs name lookup under the language's scoping rules
//! (including package imports), elaborates parameterised module/interface/
//! program instances, and lazily resolves declared types, constants, and
//! statement bodies into checked semantic nodes.
//!
//! # Architecture
//!
//! - **Compilation**: the arena and factory owning every symbol, bound node,
//!   and constant for one elaborated design
//! - **Symbol model**: a closed tagged-variant set with a common header
//!   (kind, name, location, parent scope)
//! - **Scope engine**: lazy member construction with a name map, an ordered
//!   member list, and a wildcard-import sideband, plus a dirty/rebuild
//!   protocol
//! - **Lookup engine**: five lookup modes with location-sensitive visibility
//!   and on-demand wildcard-import resolution
//! - **Lazy cells**: declaration is always safe; binding happens on first
//!   use, with re-entrancy surfacing as a cyclic-dependency diagnostic
//! - **Elaboration**: definitions plus parameter assignments produce
//!   instance scopes; generate constructs expand under constant evaluation
//!
//! # Usage
//!
//! ```rust,ignore
//! use sk_sema::{Compilation, CompilationOptions, LookupKind};
//!
//! let mut compilation = Compilation::new(tree, CompilationOptions::default());
//! let def = compilation.lookup(root, name, loc, LookupKind::Definition);
//! ```

pub mod bind;
pub mod compilation;
pub mod definition;
pub mod generate;
pub mod import;
pub mod instance;
pub mod lazy;
pub mod lookup;
pub mod scope;
pub mod symbol;

pub use bind::{BoundExprId, Expression, Statement, StatementId};
pub use compilation::{Builtins, Compilation, CompilationOptions};
pub use definition::ParameterInfo;
pub use lazy::{Lazy, LazyProbe};
pub use lookup::LookupKind;
pub use symbol::{Symbol, SymbolId, SymbolKind, SymbolTag};
