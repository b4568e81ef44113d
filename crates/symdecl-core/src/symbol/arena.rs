//! In-memory symbol source.
//!
//! [`SymbolArena`] holds a whole symbol graph in memory. It is built either
//! through the builder API (tests, tooling) or from a JSON dump:
//!
//! ```json
//! {
//!   "root": 1,
//!   "symbols": [
//!     { "id": 1, "kind": "Exe", "attributes": { "name": "game" }, "children": [2] },
//!     { "id": 2, "kind": "BaseType", "attributes": { "baseType": 6, "length": 4 } }
//!   ]
//! }
//! ```
//!
//! Attribute values are JSON booleans, numbers, strings, or `{ "symbol": id }`
//! references. Non-negative numbers load as unsigned values. `symIndexId`,
//! `symTag` and the `...Id` companions of relations are derived, never stored.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::attribute::{Attribute, Relation, Value};
use super::kind::{Symbol, SymbolId, SymbolKind};
use super::source::{ChildFilter, SymbolSource};
use crate::error::{DeclError, Result};

#[derive(Debug, Clone)]
struct Record
{
    kind: SymbolKind,
    attributes: BTreeMap<Attribute, Value>,
    children: Vec<SymbolId>,
}

/// A symbol graph held entirely in memory.
#[derive(Debug, Clone)]
pub struct SymbolArena
{
    root: SymbolId,
    // u64 so "every u32 id is taken" stays representable
    next_id: u64,
    records: BTreeMap<SymbolId, Record>,
}

impl Default for SymbolArena
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl SymbolArena
{
    /// Create an arena holding only an `Exe` root with id 1.
    #[must_use]
    pub fn new() -> Self
    {
        let root = SymbolId(1);
        let mut records = BTreeMap::new();
        records.insert(
            root,
            Record {
                kind: SymbolKind::Exe,
                attributes: BTreeMap::new(),
                children: Vec::new(),
            },
        );
        Self {
            root,
            next_id: 2,
            records,
        }
    }

    /// Id of the global scope.
    #[must_use]
    pub fn root(&self) -> SymbolId
    {
        self.root
    }

    /// Number of symbols, root included.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.records.is_empty()
    }

    /// Every id in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_
    {
        self.records.keys().copied()
    }

    /// Add a symbol that is nobody's child.
    ///
    /// Type symbols referenced only through relations (pointer targets,
    /// function types) are usually added this way.
    ///
    /// ## Errors
    ///
    /// [`DeclError::Source`] once every `u32` id above the highest one in use
    /// is taken.
    pub fn add(&mut self, kind: SymbolKind) -> Result<SymbolBuilder<'_>>
    {
        let raw = u32::try_from(self.next_id)
            .map_err(|_| DeclError::Source(format!("no symbol id left above {}", u32::MAX)))?;
        let id = SymbolId(raw);
        self.next_id += 1;
        self.records.insert(
            id,
            Record {
                kind,
                attributes: BTreeMap::new(),
                children: Vec::new(),
            },
        );
        Ok(SymbolBuilder { arena: self, id })
    }

    /// Add a symbol and append it to `parent`'s children.
    ///
    /// ## Errors
    ///
    /// [`DeclError::UnknownSymbol`] if `parent` does not exist, or the
    /// errors of [`SymbolArena::add`].
    pub fn add_child(&mut self, parent: SymbolId, kind: SymbolKind) -> Result<SymbolBuilder<'_>>
    {
        if !self.records.contains_key(&parent) {
            return Err(DeclError::UnknownSymbol(parent));
        }
        let id = self.add(kind)?.id();
        self.attach(parent, id)?;
        Ok(SymbolBuilder { arena: self, id })
    }

    /// Append an existing symbol to `parent`'s children.
    pub fn attach(&mut self, parent: SymbolId, child: SymbolId) -> Result<()>
    {
        if !self.records.contains_key(&child) {
            return Err(DeclError::UnknownSymbol(child));
        }
        self.record_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Set one attribute.
    pub fn set(&mut self, id: SymbolId, attribute: Attribute, value: impl Into<Value>) -> Result<()>
    {
        self.record_mut(id)?.attributes.insert(attribute, value.into());
        Ok(())
    }

    /// Point a relation of `id` at `target`.
    pub fn link(&mut self, id: SymbolId, relation: Relation, target: SymbolId) -> Result<()>
    {
        if !self.records.contains_key(&target) {
            return Err(DeclError::UnknownSymbol(target));
        }
        self.set(id, relation.attribute(), Value::Symbol(target))
    }

    fn record(&self, id: SymbolId) -> Result<&Record>
    {
        self.records.get(&id).ok_or(DeclError::UnknownSymbol(id))
    }

    fn record_mut(&mut self, id: SymbolId) -> Result<&mut Record>
    {
        self.records.get_mut(&id).ok_or(DeclError::UnknownSymbol(id))
    }

    /// Parse a JSON symbol graph.
    ///
    /// ## Errors
    ///
    /// Fails on malformed JSON, unknown kind or attribute names, duplicate
    /// ids, and references to ids that are not in the file. A `type` chain or
    /// child list that leads back to where it started is a
    /// [`DeclError::SchemaViolation`].
    pub fn from_json(json: &str) -> Result<Self>
    {
        let file: GraphFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Parse a JSON symbol graph from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self>
    {
        let file: GraphFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    /// Load a JSON symbol graph from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self>
    {
        let path = path.as_ref();
        debug!("Loading symbol graph from {}", path.display());
        let arena = Self::from_reader(fs::File::open(path)?)?;
        debug!("Loaded {} symbols (root {})", arena.len(), arena.root);
        Ok(arena)
    }

    /// Serialize the graph in the JSON layout [`SymbolArena::from_json`] reads.
    pub fn to_json(&self) -> Result<String>
    {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }

    /// Write the graph to disk as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()>
    {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    fn from_file(file: GraphFile) -> Result<Self>
    {
        let mut records = BTreeMap::new();
        for entry in file.symbols {
            let kind = entry
                .kind
                .parse::<SymbolKind>()
                .map_err(|err| DeclError::Source(format!("symbol {}: {err}", entry.id)))?;
            let mut attributes = BTreeMap::new();
            for (name, raw) in entry.attributes {
                let attribute = name
                    .parse::<Attribute>()
                    .map_err(|err| DeclError::Source(format!("symbol {}: {err}", entry.id)))?;
                attributes.insert(attribute, Value::from(raw));
            }
            let record = Record {
                kind,
                attributes,
                children: entry.children,
            };
            if records.insert(entry.id, record).is_some() {
                return Err(DeclError::Source(format!("duplicate symbol id {}", entry.id)));
            }
        }

        if !records.contains_key(&file.root) {
            return Err(DeclError::UnknownSymbol(file.root));
        }
        for (id, record) in &records {
            let references = record
                .children
                .iter()
                .copied()
                .chain(record.attributes.values().filter_map(Value::as_symbol));
            for target in references {
                if !records.contains_key(&target) {
                    return Err(DeclError::Source(format!("symbol {id} references unknown symbol {target}")));
                }
            }
        }

        reject_type_cycles(&records)?;
        reject_child_cycles(&records)?;

        let next_id = records.keys().next_back().map_or(1, |id| u64::from(id.0) + 1);
        Ok(Self {
            root: file.root,
            next_id,
            records,
        })
    }

    fn to_file(&self) -> GraphFile
    {
        let symbols = self
            .records
            .iter()
            .map(|(id, record)| SymbolEntry {
                id: *id,
                kind: record.kind.name().to_string(),
                attributes: record
                    .attributes
                    .iter()
                    .map(|(attribute, value)| (attribute.name().to_string(), RawValue::from(value.clone())))
                    .collect(),
                children: record.children.clone(),
            })
            .collect();
        GraphFile {
            root: self.root,
            symbols,
        }
    }
}

fn cycle_error(records: &BTreeMap<SymbolId, Record>, id: SymbolId, field: &'static str) -> DeclError
{
    let kind = records.get(&id).map_or(SymbolKind::Null, |record| record.kind);
    DeclError::violation(id, kind, field, "leads back to this symbol")
}

/// Every symbol has at most one `type` link, so each chain is walked once.
fn reject_type_cycles(records: &BTreeMap<SymbolId, Record>) -> Result<()>
{
    let mut settled: HashSet<SymbolId> = HashSet::new();
    for start in records.keys() {
        let mut chain: Vec<SymbolId> = Vec::new();
        let mut current = Some(*start);
        while let Some(id) = current {
            if settled.contains(&id) {
                break;
            }
            if chain.contains(&id) {
                return Err(cycle_error(records, id, "type"));
            }
            chain.push(id);
            current = records
                .get(&id)
                .and_then(|record| record.attributes.get(&Attribute::Type))
                .and_then(Value::as_symbol);
        }
        settled.extend(chain);
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit
{
    Open,
    Done,
}

/// Depth-first walk over child lists; reaching an open symbol again is a cycle.
///
/// Mixed paths (a member whose `type` points back at its class) are ordinary
/// and are not checked here.
fn reject_child_cycles(records: &BTreeMap<SymbolId, Record>) -> Result<()>
{
    let mut visits: HashMap<SymbolId, Visit> = HashMap::new();
    for start in records.keys() {
        if visits.contains_key(start) {
            continue;
        }
        visits.insert(*start, Visit::Open);
        let mut stack: Vec<(SymbolId, usize)> = vec![(*start, 0)];
        while let Some(&(id, index)) = stack.last() {
            let next = records.get(&id).and_then(|record| record.children.get(index)).copied();
            let Some(child) = next else {
                visits.insert(id, Visit::Done);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            match visits.get(&child) {
                Some(Visit::Open) => return Err(cycle_error(records, child, "children")),
                Some(Visit::Done) => {}
                None => {
                    visits.insert(child, Visit::Open);
                    stack.push((child, 0));
                }
            }
        }
    }
    Ok(())
}

impl SymbolSource for SymbolArena
{
    fn symbol(&self, id: SymbolId) -> Result<Symbol>
    {
        Ok(Symbol::new(id, self.record(id)?.kind))
    }

    fn attribute(&self, id: SymbolId, attribute: Attribute) -> Result<Option<Value>>
    {
        let record = self.record(id)?;
        let value = match attribute {
            Attribute::SymIndexId => Some(Value::UInt(u64::from(id.0))),
            Attribute::SymTag => Some(Value::UInt(u64::from(record.kind.raw()))),
            other => match record.attributes.get(&other) {
                Some(value) => Some(value.clone()),
                None => Relation::from_attribute(other)
                    .filter(|relation| relation.id_attribute() == Some(other))
                    .and_then(|relation| record.attributes.get(&relation.attribute()))
                    .and_then(Value::as_symbol)
                    .map(|target| Value::UInt(u64::from(target.0))),
            },
        };
        trace!("{id} {attribute} -> {value:?}");
        Ok(value)
    }

    fn children(&self, id: SymbolId, filter: &ChildFilter) -> Result<Vec<Symbol>>
    {
        let record = self.record(id)?;
        let mut found = Vec::new();
        for child in &record.children {
            let child_record = self.record(*child)?;
            let name = child_record.attributes.get(&Attribute::Name).and_then(Value::as_str);
            if filter.accepts(child_record.kind, name) {
                found.push(Symbol::new(*child, child_record.kind));
            }
        }
        Ok(found)
    }
}

/// Fluent handle returned by [`SymbolArena::add`] and [`SymbolArena::add_child`].
///
/// Attribute setters on the builder never fail; relation targets are checked
/// when the builder links them and bad targets are skipped with a debug log.
pub struct SymbolBuilder<'a>
{
    arena: &'a mut SymbolArena,
    id: SymbolId,
}

impl SymbolBuilder<'_>
{
    /// Id of the symbol being built.
    #[must_use]
    pub fn id(&self) -> SymbolId
    {
        self.id
    }

    /// Set an attribute.
    #[must_use]
    pub fn with(self, attribute: Attribute, value: impl Into<Value>) -> Self
    {
        if let Some(record) = self.arena.records.get_mut(&self.id) {
            record.attributes.insert(attribute, value.into());
        }
        self
    }

    /// Shorthand for `with(Attribute::Name, name)`.
    #[must_use]
    pub fn named(self, name: &str) -> Self
    {
        self.with(Attribute::Name, name)
    }

    /// Point a relation at an existing symbol.
    #[must_use]
    pub fn related(self, relation: Relation, target: SymbolId) -> Self
    {
        if let Err(err) = self.arena.link(self.id, relation, target) {
            debug!("Skipping {relation} link from {}: {err}", self.id);
        }
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphFile
{
    root: SymbolId,
    symbols: Vec<SymbolEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SymbolEntry
{
    id: SymbolId,
    kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, RawValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<SymbolId>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawValue
{
    Bool(bool),
    UInt(u64),
    Int(i64),
    Str(String),
    Ref
    {
        symbol: SymbolId
    },
}

impl From<RawValue> for Value
{
    fn from(raw: RawValue) -> Self
    {
        match raw {
            RawValue::Bool(b) => Self::Bool(b),
            RawValue::UInt(n) => Self::UInt(n),
            RawValue::Int(n) => Self::Int(n),
            RawValue::Str(s) => Self::Str(s),
            RawValue::Ref { symbol } => Self::Symbol(symbol),
        }
    }
}

impl From<Value> for RawValue
{
    fn from(value: Value) -> Self
    {
        match value {
            Value::Bool(b) => Self::Bool(b),
            Value::UInt(n) => Self::UInt(n),
            Value::Int(n) => Self::Int(n),
            Value::Str(s) => Self::Str(s),
            Value::Symbol(symbol) => Self::Ref { symbol },
        }
    }
}
