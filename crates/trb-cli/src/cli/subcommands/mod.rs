pub mod appeal;
pub mod appearance;
pub mod decision;
pub mod distribution;
pub mod member;
pub mod session;
pub mod vote;
pub mod voting;

pub use appeal::AppealCommands;
pub use appearance::AppearanceCommands;
pub use decision::DecisionCommands;
pub use distribution::DistributionCommands;
pub use member::MemberCommands;
pub use session::SessionCommands;
pub use vote::{VoteCastArgs, VoteCommands};
pub use voting::{VotingCommands, VotingCompleteArgs};
