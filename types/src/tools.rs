use std::collections::BTreeMap;

/// A tool entry of the setup message. Either half may be omitted.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    function_declarations: Option<Vec<FunctionDeclaration>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    google_search_retrieval: Option<GoogleSearchRetrieval>,
}

impl Tool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function_declarations(mut self, declarations: Vec<FunctionDeclaration>) -> Self {
        self.function_declarations = Some(declarations);
        self
    }

    pub fn with_function(mut self, declaration: FunctionDeclaration) -> Self {
        self.function_declarations
            .get_or_insert_with(Vec::new)
            .push(declaration);
        self
    }

    pub fn with_google_search_retrieval(mut self, retrieval: GoogleSearchRetrieval) -> Self {
        self.google_search_retrieval = Some(retrieval);
        self
    }

    pub fn function_declarations(&self) -> &[FunctionDeclaration] {
        self.function_declarations.as_deref().unwrap_or_default()
    }

    pub fn google_search_retrieval(&self) -> Option<&GoogleSearchRetrieval> {
        self.google_search_retrieval.as_ref()
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionDeclaration {
    /// The name of the function
    name: String,

    /// The description of the function
    description: String,

    /// The parameters of the function
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Schema>,
}

impl FunctionDeclaration {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Schema) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> Option<&Schema> {
        self.parameters.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ParameterType {
    #[serde(rename = "TYPE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "NUMBER")]
    Number,
    #[serde(rename = "INTEGER")]
    Integer,
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[serde(rename = "ARRAY")]
    Array,
    #[serde(rename = "OBJECT")]
    Object,
}

/// Parameter schema in the OpenAPI subset the service understands.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    parameter_type: ParameterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nullable: Option<bool>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_items: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_items: Option<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Box<Schema>>,
}

impl Schema {
    pub fn new(parameter_type: ParameterType) -> Self {
        Self {
            parameter_type,
            format: None,
            description: None,
            nullable: None,
            enum_values: None,
            max_items: None,
            min_items: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
            items: None,
        }
    }

    pub fn object() -> Self {
        Self::new(ParameterType::Object)
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_enum(mut self, values: Vec<String>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn with_item_bounds(mut self, min_items: u32, max_items: u32) -> Self {
        self.min_items = Some(min_items);
        self.max_items = Some(max_items);
        self
    }

    /// Adds a property, marking it required when `required` is set.
    pub fn with_property(mut self, name: &str, schema: Schema, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    pub fn with_items(mut self, items: Schema) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    pub fn properties(&self) -> &BTreeMap<String, Schema> {
        &self.properties
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DynamicRetrievalMode {
    #[serde(rename = "MODE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "MODE_DYNAMIC")]
    Dynamic,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSearchRetrieval {
    dynamic_retrieval_config: DynamicRetrievalConfig,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicRetrievalConfig {
    mode: DynamicRetrievalMode,
    dynamic_threshold: f32,
}

impl GoogleSearchRetrieval {
    pub fn new(mode: DynamicRetrievalMode, dynamic_threshold: f32) -> Self {
        Self {
            dynamic_retrieval_config: DynamicRetrievalConfig {
                mode,
                dynamic_threshold,
            },
        }
    }

    pub fn mode(&self) -> DynamicRetrievalMode {
        self.dynamic_retrieval_config.mode
    }

    pub fn dynamic_threshold(&self) -> f32 {
        self.dynamic_retrieval_config.dynamic_threshold
    }
}

/// A function invocation requested by the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl FunctionCall {
    pub fn new(name: &str, args: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            args,
            id: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &serde_json::Value {
        &self.args
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
