pub(crate) mod options;
pub(crate) mod solver;

pub use options::SolverOptions;

pub mod variables {
    //! Contains the variables of the solver: the [`DomainId`], which refers to a domain, and the
    //! [`AffineView`], which presents a domain through a bijective transformation. Both implement
    //! [`IntegerVariable`], so constraints accept either.
    pub use crate::engine::notifications::DomainEvent;
    pub use crate::engine::notifications::DomainEvents;
    pub use crate::engine::notifications::Watchers;
    pub use crate::engine::variables::AffineView;
    pub use crate::engine::variables::DomainId;
    pub use crate::engine::variables::IntegerVariable;
    pub use crate::engine::variables::TransformableVariable;
    pub use crate::engine::Assignments;
    pub use crate::engine::VariableNames;
}
