//! Downloaded graph-building programs
//!
//! The catalog answers a download with a declarative instruction list. Each
//! instruction addresses a graph level by group name (`graph`, absent for the
//! root graph) and nodes by name.

use crate::error::{Error, Result};
use crate::nodes::{PropertyValue, SocketDirection, SocketType};
use serde::{Deserialize, Serialize};

/// Version of the instruction format understood by this crate
pub const PROGRAM_VERSION: u32 = 1;

/// One graph-building step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    CreateGroup {
        name: String,
    },
    CreateNode {
        #[serde(default)]
        graph: Option<String>,
        name: String,
        #[serde(rename = "type")]
        node_type: String,
        /// Group referenced by a group node; must already exist
        #[serde(default)]
        group: Option<String>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        location: Option<[f32; 2]>,
    },
    AddSocket {
        #[serde(default)]
        graph: Option<String>,
        node: String,
        direction: SocketDirection,
        name: String,
        socket_type: SocketType,
    },
    SetProperty {
        #[serde(default)]
        graph: Option<String>,
        node: String,
        property: String,
        value: PropertyValue,
    },
    SetInput {
        #[serde(default)]
        graph: Option<String>,
        node: String,
        socket: String,
        value: PropertyValue,
    },
    Link {
        #[serde(default)]
        graph: Option<String>,
        from_node: String,
        from_socket: String,
        to_node: String,
        to_socket: String,
    },
    SetImage {
        #[serde(default)]
        graph: Option<String>,
        node: String,
        #[serde(default)]
        name: Option<String>,
        color_space: String,
        /// PNG data URI
        data: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProgramDocument {
    List(Vec<Instruction>),
    Versioned {
        version: u32,
        instructions: Vec<Instruction>,
    },
}

/// Program text as received from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteProgram {
    text: String,
}

impl RemoteProgram {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Builds a program from instructions, mostly for tests and tooling
    pub fn from_instructions(instructions: &[Instruction]) -> Result<Self> {
        Ok(Self::new(serde_json::to_string(instructions)?))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the program contains no instructions at all
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Parses the instruction list
    ///
    /// Accepts a bare JSON array or `{"version": 1, "instructions": [...]}`.
    /// Blank text is an empty program.
    pub fn instructions(&self) -> Result<Vec<Instruction>> {
        if self.is_blank() {
            return Ok(Vec::new());
        }
        let document: ProgramDocument = serde_json::from_str(&self.text)
            .map_err(|e| Error::structural(format!("malformed program: {}", e)))?;
        match document {
            ProgramDocument::List(instructions) => Ok(instructions),
            ProgramDocument::Versioned { version, instructions } if version == PROGRAM_VERSION => {
                Ok(instructions)
            }
            ProgramDocument::Versioned { version, .. } => Err(Error::structural(format!(
                "unsupported program version {}",
                version
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_program_is_empty() {
        assert!(RemoteProgram::new("").instructions().unwrap().is_empty());
        assert!(RemoteProgram::new("  \n ").instructions().unwrap().is_empty());
    }

    #[test]
    fn test_parse_list_and_versioned_forms() {
        let list = RemoteProgram::new(
            r#"[{"op": "create_node", "name": "Value", "type": "ShaderNodeValue"}]"#,
        );
        let versioned = RemoteProgram::new(
            r#"{"version": 1, "instructions": [{"op": "create_node", "name": "Value", "type": "ShaderNodeValue"}]}"#,
        );
        let expected = vec![Instruction::CreateNode {
            graph: None,
            name: "Value".into(),
            node_type: "ShaderNodeValue".into(),
            group: None,
            label: None,
            location: None,
        }];
        assert_eq!(list.instructions().unwrap(), expected);
        assert_eq!(versioned.instructions().unwrap(), expected);
    }

    #[test]
    fn test_parse_typed_values() {
        let program = RemoteProgram::new(
            r#"[{"op": "set_input", "node": "BSDF", "socket": "Roughness", "value": {"type": "float", "value": 0.25}},
                {"op": "add_socket", "graph": "Bark", "node": "Group Input", "direction": "output", "name": "Scale", "socket_type": "float"}]"#,
        );
        let instructions = program.instructions().unwrap();
        assert_eq!(
            instructions[0],
            Instruction::SetInput {
                graph: None,
                node: "BSDF".into(),
                socket: "Roughness".into(),
                value: PropertyValue::Float(0.25),
            }
        );
        assert!(matches!(
            &instructions[1],
            Instruction::AddSocket { graph: Some(g), direction: SocketDirection::Output, .. } if g == "Bark"
        ));
    }

    #[test]
    fn test_rejects_code_and_unknown_versions() {
        let python = RemoteProgram::new("import bpy\nbpy.data.materials.new('Rock')");
        assert!(matches!(python.instructions(), Err(Error::Structural(_))));

        let future = RemoteProgram::new(r#"{"version": 2, "instructions": []}"#);
        assert!(matches!(future.instructions(), Err(Error::Structural(_))));

        let unknown_op = RemoteProgram::new(r#"[{"op": "exec", "code": "rm -rf /"}]"#);
        assert!(unknown_op.instructions().is_err());
    }
}
