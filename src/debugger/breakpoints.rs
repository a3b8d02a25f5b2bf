use crate::error::DebuggerError;
use crate::host::Callable;
use bitflags::bitflags;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BreakpointKind: u8 {
        const CONDITIONAL = 0b01;
        const ONE_SHOT = 0b10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakpointId(u64);

/// Strip everything up to the last path separator, `/` or `\`.
pub fn file_name_of(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

pub struct BreakpointRecord {
    pub id: BreakpointId,
    pub line: i64,
    pub file_name: String,
    pub kind: BreakpointKind,
    /// Present iff `kind` contains `CONDITIONAL`.
    pub condition: Option<Rc<dyn Callable>>,
}

impl fmt::Debug for BreakpointRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreakpointRecord")
            .field("id", &self.id)
            .field("line", &self.line)
            .field("file_name", &self.file_name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Breakpoints keyed by line, then by file name.
pub struct BreakpointTable {
    lines: HashMap<i64, HashMap<String, BreakpointRecord>>,
    next_id: u64,
}

impl BreakpointTable {
    pub fn with_capacity(capacity: usize) -> Result<Self, DebuggerError> {
        let mut lines = HashMap::new();
        lines.try_reserve(capacity).map_err(DebuggerError::Init)?;
        Ok(Self { lines, next_id: 1 })
    }

    pub fn contains(&self, line: i64, file_name: &str) -> bool {
        self.lookup(line, file_name).is_some()
    }

    /// Insert a breakpoint unless one already occupies `(line, file_name)`.
    ///
    /// Returns the id of the stored record, which is the existing one when
    /// the slot was taken.
    pub fn insert(
        &mut self,
        line: i64,
        file_name: &str,
        condition: Option<Rc<dyn Callable>>,
        one_shot: bool,
    ) -> Result<BreakpointId, DebuggerError> {
        if !self.lines.contains_key(&line) {
            self.lines
                .try_reserve(1)
                .map_err(|source| DebuggerError::Allocation { line, source })?;
        }
        let files = self.lines.entry(line).or_default();

        if let Some(existing) = files.get(file_name) {
            return Ok(existing.id);
        }
        if let Err(source) = files.try_reserve(1) {
            if files.is_empty() {
                self.lines.remove(&line);
            }
            return Err(DebuggerError::Allocation { line, source });
        }

        let mut kind = BreakpointKind::empty();
        if condition.is_some() {
            kind |= BreakpointKind::CONDITIONAL;
        }
        if one_shot {
            kind |= BreakpointKind::ONE_SHOT;
        }

        let id = BreakpointId(self.next_id);
        self.next_id += 1;
        files.insert(
            file_name.to_string(),
            BreakpointRecord {
                id,
                line,
                file_name: file_name.to_string(),
                kind,
                condition,
            },
        );
        Ok(id)
    }

    pub fn lookup(&self, line: i64, file_name: &str) -> Option<&BreakpointRecord> {
        self.lines.get(&line)?.get(file_name)
    }

    pub fn remove(&mut self, line: i64, file_name: &str) -> Option<BreakpointRecord> {
        let files = self.lines.get_mut(&line)?;
        let record = files.remove(file_name)?;
        if files.is_empty() {
            self.lines.remove(&line);
        }
        Some(record)
    }

    /// Remove the record at `(line, file_name)` only if it is still `id`.
    pub fn remove_if(&mut self, line: i64, file_name: &str, id: BreakpointId) -> bool {
        match self.lookup(line, file_name) {
            Some(record) if record.id == id => self.remove(line, file_name).is_some(),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BreakpointRecord> {
        self.lines.values().flat_map(HashMap::values)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
