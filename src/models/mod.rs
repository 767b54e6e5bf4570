pub mod collection;
pub mod export;
pub mod rule;
pub mod settings;
pub mod tab;

pub use collection::{Collection, CollectionKind};
pub use export::{ExportDocument, EXPORT_VERSION};
pub use rule::{AutomationRule, Condition, DomainOperator, RuleAction, RuleUpdate};
pub use settings::{Settings, SettingsPatch};
pub use tab::{TabId, TabSnapshot};
