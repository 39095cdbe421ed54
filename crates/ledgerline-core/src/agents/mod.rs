//! ERP agents
//!
//! Four specialized agents (finance, inventory, sales, HR) each own a narrow
//! tool set and a guardrail set. The coordinator reaches them through
//! [`AgentTool`], which exposes a whole agent as a single tool.

pub mod delegate;
pub mod erp;
pub mod profile;

pub use delegate::AgentTool;
pub use erp::{erp_agents, finance_agent, hr_agent, inventory_agent, sales_agent};
pub use profile::AgentProfile;
