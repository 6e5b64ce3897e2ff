use crate::error::ToolError;
use crate::funds::{
    FundEtfHistSinaTool, FundEtfHistTool, FundEtfSpotTool, FundHkRankTool, FundInfoIndexTool,
    FundNameTool,
};
use crate::indexes::{HkIndexInfoTool, UsIndexInfoTool};
use crate::stocks::{HkStockInfoTool, SingleStockInfoTool, StockIndicatorTool, UsStockInfoTool};
use crate::Tool;
use connectors::MarketClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Name → tool lookup for dispatching remote calls.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        ToolRegistry {
            tools: HashMap::new(),
        }
    }

    /// Registry with the full market-data tool set, all sharing one HTTP
    /// client.
    pub fn with_defaults(client: Arc<MarketClient>) -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(HkStockInfoTool::new(client.clone())));
        registry.register(Arc::new(UsStockInfoTool::new(client.clone())));
        registry.register(Arc::new(SingleStockInfoTool::new(client.clone())));
        registry.register(Arc::new(StockIndicatorTool::new(client.clone())));

        registry.register(Arc::new(HkIndexInfoTool::new(client.clone())));
        registry.register(Arc::new(UsIndexInfoTool::new(client.clone())));

        registry.register(Arc::new(FundNameTool::new(client.clone())));
        registry.register(Arc::new(FundInfoIndexTool::new(client.clone())));
        registry.register(Arc::new(FundEtfSpotTool::new(client.clone())));
        registry.register(Arc::new(FundEtfHistTool::new(client.clone())));
        registry.register(Arc::new(FundEtfHistSinaTool::new(client.clone())));
        registry.register(Arc::new(FundHkRankTool::new(client)));

        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.schema().name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.tools.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Tool descriptors in the `tools/list` wire shape.
    pub fn schemas(&self) -> Vec<Value> {
        self.names()
            .into_iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                let schema = tool.schema();
                json!({
                    "name": schema.name,
                    "description": schema.description,
                    "inputSchema": schema.parameters,
                })
            })
            .collect()
    }

    /// Validate and run one tool call.
    pub async fn execute(&self, name: &str, params: Value) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.validate(&params)?;
        debug!(tool = name, "executing tool");
        tool.execute(params).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ToolRegistry {
        let client = Arc::new(MarketClient::new().unwrap());
        ToolRegistry::with_defaults(client)
    }

    #[test]
    fn default_registry_carries_the_full_tool_set() {
        let names = registry().names();
        assert_eq!(names.len(), 12);
        for expected in [
            "get_hk_stock_info",
            "get_us_stock_info",
            "get_hk_index_info",
            "get_us_index_info",
            "get_single_stock_info",
            "get_stock_indicator",
            "fund_name_em",
            "fund_info_index_em",
            "fund_etf_spot_ths",
            "fund_etf_hist_em",
            "fund_etf_hist_sina",
            "fund_hk_rank_em",
        ] {
            assert!(names.contains(&expected), "missing tool {expected}");
        }
    }

    #[test]
    fn schemas_expose_input_schema_objects() {
        for schema in registry().schemas() {
            assert!(schema["name"].is_string());
            assert!(schema["inputSchema"]["type"] == "object");
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let err = registry()
            .execute("no_such_tool", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn invalid_params_fail_before_any_fetch() {
        let err = registry()
            .execute("get_single_stock_info", json!({"stock_code": "600000"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
