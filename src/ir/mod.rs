//! Structural declaration tree shared by the parser, the entry-point
//! selection and the output layer.

mod nodes;

pub use nodes::{DistilledFile, Node, Parameter, Visibility};
