pub mod appeal;
pub mod appearance;
pub mod audit;
pub mod decision;
pub mod dispatch;
pub mod distribution;
pub mod member;
pub mod session;
pub mod shared;
pub mod vote;
pub mod voting;
