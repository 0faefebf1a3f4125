//! Filter compilation.
//!
//! A filter is compact text such as `{age:gt:18|AND|(name:sw:jo|OR|name:null)}`.
//! [`compile_filter`] turns it into a parenthesised SQL predicate with `:name`
//! placeholders, the arguments for those placeholders and the set of columns
//! it touches. [`FilterPredicate`] covers predicates the DSL cannot express.

mod compiler;
mod operator;
mod predicate;

pub use compiler::{bind_stem, compile_filter, CompiledFilter, FilterClause};
pub use operator::{Arity, Operator};
pub use predicate::FilterPredicate;
pub(crate) use predicate::check_named_variable;
