use std::collections::HashMap;

use crate::{parser::Parser, MethodAccessFlags, Result, SourcePosition};

/// Maps a method signature such as `void run(int,java.lang.String[])` to the
/// position of the method that declared it.
pub type MethodPositions = HashMap<String, SourcePosition>;

/// The methods of one class file, in declaration order.
#[derive(Debug, Default)]
pub struct MethodTable {
    pub methods: Vec<MethodEntry>,
}
impl MethodTable {
    pub fn parse(bytes: &[u8]) -> Result<MethodTable> {
        Parser::new(bytes).parse()
    }

    /// Folds the table into a signature map. When two methods render to the
    /// same signature, the one declared later wins.
    pub fn positions(&self) -> MethodPositions {
        let mut positions = HashMap::with_capacity(self.methods.len());
        for method in &self.methods {
            positions.insert(method.signature.clone(), method.position);
        }
        positions
    }

    pub fn by_signature(&self, signature: &str) -> Option<&MethodEntry> {
        self.methods.iter().rev().find(|m| m.signature == signature)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodEntry {
    /// 0-based index in the `methods` table.
    pub order: i32,
    pub access_flags: MethodAccessFlags,
    pub name: String,
    pub descriptor: String,
    pub signature: String,
    pub position: SourcePosition,
}
