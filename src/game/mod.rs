pub mod controller;
pub mod eval;
pub mod prompt;
pub mod resolver;
pub mod rules;
pub mod session;

pub use controller::{GameController, GamePhase, GameState, MoveRecord};
pub use eval::{Evaluation, Evaluator, StockfishEvaluator};
pub use prompt::{ConsolePrompter, Prompter};
pub use resolver::{MoveResolver, ResolvedMove};
pub use rules::{Accepted, RulesEngine, ShakmatyRules};
pub use session::Session;
