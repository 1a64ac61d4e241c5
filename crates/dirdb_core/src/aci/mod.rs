//! Access control information tuples and the tuple filter chain.
//!
//! An access-control decision point starts from the set of ACI tuples
//! that name an operation's target, then runs them through a pipeline
//! of filters. Each filter narrows the set; the surviving tuples are
//! what the decision point grants or denies from.

mod context;
mod filter;
mod tuple;

pub use context::{AciContext, OperationScope};
pub use filter::{
    MaxImmSubFilter, MostSpecificUserClassFilter, RelatedUserClassFilter, ScopeFilter,
    TupleFilter, TupleFilterChain,
};
pub use tuple::{AciTuple, AuthenticationLevel, ProtectedItem, UserClass};
