//! Node-type registry.
//!
//! Two layers:
//! - A static table of the builtin kinds ([`KindSpec`]): required input
//!   slots, whether the kind produces a reusable value, and which nested
//!   blocks it owns. Initialized at compile time, never written.
//! - Data-driven `call_function` entries ([`FunctionSignature`]) built from
//!   node-type definitions ([`NodeDefinition`]), the JSON shape produced by
//!   module introspection. These give registered callees named parameter
//!   slots instead of positional `arg0`, `arg1`, ... slots.
//!
//! Both the compiler (validation) and the decompiler (classification of
//! call arguments) consult the same [`Registry`] value.

use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::node::NodeKind;

/// Static description of one builtin node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    pub kind: NodeKind,
    /// Required input slot names, in emission order. Empty for kinds whose
    /// slots depend on the callee.
    pub inputs: &'static [&'static str],
    /// True when the slots are determined by the callee (`call_function`).
    pub callee_inputs: bool,
    /// True when the kind's translated form is an expression other nodes
    /// may link to.
    pub produces_value: bool,
    pub has_body: bool,
    pub has_orelse: bool,
}

static BUILTIN_KINDS: [KindSpec; 6] = [
    KindSpec {
        kind: NodeKind::VariableAssign,
        inputs: &["value"],
        callee_inputs: false,
        produces_value: true,
        has_body: false,
        has_orelse: false,
    },
    KindSpec {
        kind: NodeKind::Print,
        inputs: &["target"],
        callee_inputs: false,
        produces_value: false,
        has_body: false,
        has_orelse: false,
    },
    KindSpec {
        kind: NodeKind::BinaryOp,
        inputs: &["left", "right"],
        callee_inputs: false,
        produces_value: true,
        has_body: false,
        has_orelse: false,
    },
    KindSpec {
        kind: NodeKind::IfStatement,
        inputs: &["test"],
        callee_inputs: false,
        produces_value: false,
        has_body: true,
        has_orelse: true,
    },
    KindSpec {
        kind: NodeKind::ForLoop,
        inputs: &["iter"],
        callee_inputs: false,
        produces_value: false,
        has_body: true,
        has_orelse: false,
    },
    KindSpec {
        kind: NodeKind::CallFunction,
        inputs: &[],
        callee_inputs: true,
        produces_value: true,
        has_body: false,
        has_orelse: false,
    },
];

/// Slot name for the `index`-th positional argument of an unregistered
/// callee.
pub fn positional_slot(index: usize) -> String {
    format!("arg{}", index)
}

/// One parameter of a registered callee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub required: bool,
}

/// A registered `call_function` callee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// The callee as written at a call site (`len`, `math.sqrt`).
    pub call_name: String,
    pub module: Option<String>,
    pub func_name: String,
    pub params: Vec<ParamSpec>,
    pub doc: Option<String>,
}

impl FunctionSignature {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }
}

/// Parameter entry of a node-type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionInput {
    pub name: String,
    #[serde(default)]
    pub type_hint: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// Output entry of a node-type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionOutput {
    pub name: String,
    #[serde(default)]
    pub type_hint: Option<String>,
}

/// A node-type definition as produced by module introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub node_type: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub func_name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub inputs: Vec<DefinitionInput>,
    #[serde(default)]
    pub outputs: Vec<DefinitionOutput>,
}

impl NodeDefinition {
    /// Name a call site uses for this function: the bare name for
    /// `builtins`, `module.func` otherwise.
    pub fn call_name(&self) -> String {
        match self.module.as_deref() {
            None | Some("") | Some("builtins") => self.func_name.clone(),
            Some(module) => format!("{}.{}", module, self.func_name),
        }
    }
}

/// The node-type registry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    functions: IndexMap<String, FunctionSignature>,
}

impl Registry {
    /// A registry with the builtin kinds and no function definitions.
    pub fn new() -> Self {
        Registry {
            functions: IndexMap::new(),
        }
    }

    /// Process-wide read-only registry with only the builtin kinds.
    pub fn builtin() -> &'static Registry {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(Registry::new)
    }

    /// Builds a registry from node-type definitions.
    pub fn with_definitions(
        definitions: impl IntoIterator<Item = NodeDefinition>,
    ) -> Result<Self, CoreError> {
        let mut registry = Registry::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Builds a registry from a JSON array of node-type definitions.
    pub fn from_definitions_json(json: &str) -> Result<Self, CoreError> {
        let definitions: Vec<NodeDefinition> =
            serde_json::from_str(json).map_err(CoreError::MalformedDefinitions)?;
        Self::with_definitions(definitions)
    }

    /// Adds one definition as a `call_function` entry.
    pub fn register(&mut self, definition: NodeDefinition) -> Result<(), CoreError> {
        let call_name = definition.call_name();
        if definition.node_type != NodeKind::CallFunction.as_str() {
            return Err(CoreError::UnsupportedDefinition {
                name: call_name,
                node_type: definition.node_type,
            });
        }
        if self.functions.contains_key(&call_name) {
            return Err(CoreError::DuplicateDefinition { name: call_name });
        }

        let signature = FunctionSignature {
            call_name: call_name.clone(),
            module: definition.module,
            func_name: definition.func_name,
            params: definition
                .inputs
                .into_iter()
                .map(|input| ParamSpec {
                    name: input.name,
                    required: input.required,
                })
                .collect(),
            doc: definition.doc,
        };
        tracing::trace!(callee = %call_name, params = signature.params.len(), "registered callee");
        self.functions.insert(call_name, signature);
        Ok(())
    }

    /// Static description of a builtin kind.
    pub fn spec(kind: NodeKind) -> &'static KindSpec {
        // BUILTIN_KINDS is laid out in NodeKind::ALL order.
        &BUILTIN_KINDS[kind as usize]
    }

    /// Looks up a kind by its raw `type` string.
    pub fn lookup(type_name: &str) -> Option<&'static KindSpec> {
        BUILTIN_KINDS.iter().find(|spec| spec.kind.as_str() == type_name)
    }

    /// Registered callee by call name.
    pub fn function(&self, call_name: &str) -> Option<&FunctionSignature> {
        self.functions.get(call_name)
    }

    /// All registered callees, in registration order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.functions.values()
    }
}
