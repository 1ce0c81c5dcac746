//! Traversal driver: exhaustive paging and structural descent

mod descent;
mod pages;

pub use descent::{count_reachable, descend_to_leaves, Descent, DescentFailure, DescentSpec, Leaf};
pub use pages::{first_related, for_each_of_type, for_each_related, ElementPages, RelatedPages};
