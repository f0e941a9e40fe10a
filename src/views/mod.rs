mod commit_detail;
mod commit_graph;

pub use commit_detail::CommitDetailView;
pub use commit_graph::CommitGraphView;
