//! Declarative tool descriptors.
//!
//! A [`ToolDescriptor`] is the single source of truth for a tool: it drives the advertised MCP
//! input schema, argument validation, and how arguments are placed on the upstream request.

use crate::error::{Result, SnapprError};
use crate::semantics::HttpMethod;
use crate::summary::Summarize;
use jsonschema::Validator;
use rmcp::model::{JsonObject, Tool};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;

/// Where a tool argument goes on the upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// Substituted into `{name}` in the path template.
    Path,
    Query,
    /// JSON body field; dotted upstream names (`contact.name`) address nested objects.
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    StringArray,
}

impl ParamType {
    fn schema(self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Number => json!({ "type": "number" }),
            Self::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: &'static str,
    pub upstream_name: &'static str,
    pub location: ParamLocation,
    pub ty: ParamType,
    pub required: bool,
    pub description: &'static str,
    pub default: Option<Value>,
    pub allowed: Option<&'static [&'static str]>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    /// Do not send the parameter upstream when it has this value.
    pub omit_when: Option<&'static str>,
}

impl ToolParam {
    #[must_use]
    pub fn new(
        name: &'static str,
        location: ParamLocation,
        ty: ParamType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            upstream_name: name,
            location,
            ty,
            // Path params are always required.
            required: matches!(location, ParamLocation::Path),
            description,
            default: None,
            allowed: None,
            minimum: None,
            maximum: None,
            omit_when: None,
        }
    }

    #[must_use]
    pub fn path(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamLocation::Path, ParamType::String, description)
    }

    #[must_use]
    pub fn query(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self::new(name, ParamLocation::Query, ty, description)
    }

    #[must_use]
    pub fn body(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self::new(name, ParamLocation::Body, ty, description)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn upstream(mut self, upstream_name: &'static str) -> Self {
        self.upstream_name = upstream_name;
        self
    }

    #[must_use]
    pub fn default_value(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    #[must_use]
    pub fn range(mut self, minimum: Option<i64>, maximum: Option<i64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    #[must_use]
    pub fn omit_when(mut self, value: &'static str) -> Self {
        self.omit_when = Some(value);
        self
    }

    fn schema(&self) -> Value {
        let mut schema = self.ty.schema();
        schema["description"] = json!(self.description);
        if let Some(allowed) = self.allowed {
            schema["enum"] = json!(allowed);
        }
        if let Some(min) = self.minimum {
            schema["minimum"] = json!(min);
        }
        if let Some(max) = self.maximum {
            schema["maximum"] = json!(max);
        }
        if matches!(self.location, ParamLocation::Path) {
            schema["minLength"] = json!(1);
        }
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        schema
    }
}

#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub method: HttpMethod,
    /// Endpoint path relative to the base URL, with `{param}` placeholders.
    pub path: &'static str,
    pub params: Vec<ToolParam>,
    /// Parameters that are only meaningful together (both or neither).
    pub pairs: Vec<(&'static str, &'static str)>,
    /// Human-readable lead-in for successful JSON results.
    pub summary: Option<Summarize>,
}

impl ToolDescriptor {
    #[must_use]
    pub fn new(
        name: &'static str,
        method: HttpMethod,
        path: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            method,
            path,
            params: Vec::new(),
            pairs: Vec::new(),
            summary: None,
        }
    }

    #[must_use]
    pub fn param(mut self, param: ToolParam) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn paired(mut self, a: &'static str, b: &'static str) -> Self {
        self.pairs.push((a, b));
        self
    }

    #[must_use]
    pub fn summarized(mut self, summary: Summarize) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Summary text for a successful call, if this tool has one.
    #[must_use]
    pub fn summarize(&self, args: &Value, body: &Value) -> Option<String> {
        self.summary.map(|f| f(args, body))
    }

    #[must_use]
    pub fn find_param(&self, name: &str) -> Option<&ToolParam> {
        self.params.iter().find(|p| p.name == name)
    }

    /// The advertised JSON Schema for this tool's arguments.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let mut properties = json!({});
        let mut required: Vec<&str> = Vec::new();

        for param in &self.params {
            properties[param.name] = param.schema();
            if param.required && param.default.is_none() {
                required.push(param.name);
            }
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// The MCP `Tool` advertised in `tools/list`.
    #[must_use]
    pub fn to_mcp_tool(&self) -> Tool {
        let schema_obj = self
            .input_schema()
            .as_object()
            .cloned()
            .unwrap_or_else(JsonObject::new);
        let mut tool = Tool::new(self.name, self.description, Arc::new(schema_obj));
        tool.annotations = Some(self.method.annotations());
        tool
    }
}

/// A descriptor with its compiled validator and advertised MCP tool.
pub struct RegisteredTool {
    pub descriptor: ToolDescriptor,
    pub validator: Validator,
    pub tool: Tool,
}

/// Immutable tool registry, built once at start-up.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Build a registry, compiling each tool's input schema.
    ///
    /// # Errors
    ///
    /// Returns [`SnapprError::Config`] on duplicate tool names, duplicate parameter names, path
    /// placeholders without a matching path parameter, or an uncompilable schema.
    pub fn new(descriptors: Vec<ToolDescriptor>) -> Result<Self> {
        let mut names: HashSet<&'static str> = HashSet::new();
        let mut tools = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if !names.insert(descriptor.name) {
                return Err(SnapprError::Config(format!(
                    "Duplicate tool name '{}'",
                    descriptor.name
                )));
            }
            check_params(&descriptor)?;

            let validator = jsonschema::validator_for(&descriptor.input_schema()).map_err(|e| {
                SnapprError::Config(format!(
                    "Invalid input schema for tool '{}': {e}",
                    descriptor.name
                ))
            })?;
            let tool = descriptor.to_mcp_tool();
            tools.push(RegisteredTool {
                descriptor,
                validator,
                tool,
            });
        }

        Ok(Self { tools })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.descriptor.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn check_params(descriptor: &ToolDescriptor) -> Result<()> {
    let mut param_names: HashSet<&'static str> = HashSet::new();
    for p in &descriptor.params {
        if !param_names.insert(p.name) {
            return Err(SnapprError::Config(format!(
                "Duplicate param '{}' in tool '{}'",
                p.name, descriptor.name
            )));
        }
        if matches!(p.location, ParamLocation::Path)
            && !descriptor.path.contains(&format!("{{{}}}", p.upstream_name))
        {
            return Err(SnapprError::Config(format!(
                "Path param '{}' has no placeholder in '{}' (tool '{}')",
                p.name, descriptor.path, descriptor.name
            )));
        }
    }
    for (a, b) in &descriptor.pairs {
        if !param_names.contains(a) || !param_names.contains(b) {
            return Err(SnapprError::Config(format!(
                "Paired params '{a}'/'{b}' are not both declared in tool '{}'",
                descriptor.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_tool() -> ToolDescriptor {
        ToolDescriptor::new("get_thing", HttpMethod::Get, "things/{id}", "Get a thing")
            .param(ToolParam::path("id", "Thing id"))
            .param(
                ToolParam::query("kind", ParamType::String, "Kind filter")
                    .one_of(&["a", "b", "all"])
                    .default_value(json!("all")),
            )
    }

    #[test]
    fn input_schema_lists_required_and_defaults() {
        let schema = lookup_tool().input_schema();
        assert_eq!(schema["required"], json!(["id"]));
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(schema["properties"]["kind"]["default"], json!("all"));
        assert_eq!(schema["properties"]["kind"]["enum"], json!(["a", "b", "all"]));
        assert_eq!(schema["properties"]["id"]["minLength"], json!(1));
    }

    #[test]
    fn input_schema_omits_empty_required_list() {
        let schema = ToolDescriptor::new("list", HttpMethod::Get, "things", "List").input_schema();
        assert!(schema.get("required").is_none());
    }

    #[test]
    fn mcp_tool_carries_annotations() {
        let tool = lookup_tool().to_mcp_tool();
        assert_eq!(tool.name, "get_thing");
        let annotations = tool.annotations.expect("annotations");
        assert_eq!(annotations.read_only_hint, Some(true));
    }

    #[test]
    fn registry_rejects_duplicate_tool_names() {
        let res = ToolRegistry::new(vec![lookup_tool(), lookup_tool()]);
        assert!(matches!(res, Err(SnapprError::Config(msg)) if msg.contains("Duplicate tool")));
    }

    #[test]
    fn registry_rejects_duplicate_params() {
        let tool = lookup_tool().param(ToolParam::path("id", "again"));
        let res = ToolRegistry::new(vec![tool]);
        assert!(matches!(res, Err(SnapprError::Config(msg)) if msg.contains("Duplicate param")));
    }

    #[test]
    fn registry_rejects_path_param_without_placeholder() {
        let tool = ToolDescriptor::new("bad", HttpMethod::Get, "things", "Bad")
            .param(ToolParam::path("id", "Thing id"));
        assert!(ToolRegistry::new(vec![tool]).is_err());
    }

    #[test]
    fn registry_rejects_undeclared_pairs() {
        let tool = lookup_tool().paired("id", "missing");
        assert!(ToolRegistry::new(vec![tool]).is_err());
    }
}
