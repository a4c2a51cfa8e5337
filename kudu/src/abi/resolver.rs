//! The type-graph resolver (spec.md §4.1, §9): a two-pass builder that
//! turns an [`AbiDefinition`] into an arena of [`TypeNode`]s addressed by
//! stable [`TypeIndex`]es, replacing the teacher's `HashMap<TypeName, _>`
//! walk-on-every-lookup design (`antelope-abi/src/abi.rs`'s `ABI::set_abi`/
//! `is_type`/`resolve_type`). The suffix-peeling and depth-bounded
//! recursion below are grounded directly on `get_type`/`fill_struct`/
//! `fill_variant` in `examples/original_source/src/abieos.hpp`.

use std::collections::HashMap;
use std::str::FromStr;

use strum::VariantNames;

use crate::abi::data::ABI_SCHEMA;
use crate::abi::definition::{AbiDefinition, Struct as RawStruct, Variant as RawVariant};
use crate::abi::error::{AbiError, SchemaSnafu};
use crate::abi::path::Path;
use crate::types::value::PrimId;

/// The ABI type graph rejects any alias/struct/variant dependency chain
/// deeper than this many hops, matching `abieos.hpp`'s `depth >= 32` guard.
const MAX_RESOLVE_DEPTH: usize = 32;

pub type TypeIndex = usize;
pub type StructIndex = usize;
pub type VariantIndex = usize;

#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(PrimId),
    Optional(TypeIndex),
    Array(TypeIndex),
    Extension(TypeIndex),
    Struct(StructIndex),
    Variant(VariantIndex),
    Alias(TypeIndex),
}

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub name: String,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, Default)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<(String, TypeIndex)>,
    filled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VariantDef {
    pub name: String,
    pub types: Vec<TypeIndex>,
    filled: bool,
}

struct RawStructEntry {
    base: Option<String>,
    fields: Vec<(String, String)>,
}

/// The resolved type graph for one contract, plus its action/table
/// dispatch tables (spec.md §4.1 items 3-4).
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    nodes: Vec<TypeNode>,
    structs: Vec<StructDef>,
    variants: Vec<VariantDef>,
    by_name: HashMap<String, TypeIndex>,
    actions: HashMap<String, TypeIndex>,
    tables: HashMap<String, TypeIndex>,
    /// `new_type_name -> type` typedefs not yet folded into `nodes`/`by_name`.
    /// `get_type` re-derefs this map on every lookup of an unresolved alias
    /// rather than caching a "currently resolving" marker, so a
    /// self-referential typedef (`type_def{new: "t", type: "t"}`) recurses
    /// through the same entry over and over and trips the depth guard —
    /// matching `abieos.hpp::get_type`'s behavior exactly.
    pending_aliases: HashMap<String, String>,
}

fn schema_err(message: impl Into<String>) -> AbiError {
    SchemaSnafu { path: Path::root(), message: message.into() }.build()
}

impl Resolver {
    /// A resolver seeded with every primitive in [`PrimId`] and the
    /// built-in `extended_asset` struct, but no user types yet.
    pub fn with_builtins() -> Self {
        let mut r = Self::default();
        for name in PrimId::VARIANTS {
            let id = PrimId::from_str(name).expect("VARIANTS and FromStr stay in sync");
            r.push_node(name.to_string(), TypeKind::Primitive(id));
        }

        let asset_idx = *r.by_name.get("asset").expect("asset primitive registered above");
        let name_idx = *r.by_name.get("name").expect("name primitive registered above");
        let struct_idx = r.structs.len();
        r.structs.push(StructDef {
            name: "extended_asset".to_owned(),
            fields: vec![("quantity".to_owned(), asset_idx), ("contract".to_owned(), name_idx)],
            filled: true,
        });
        r.push_node("extended_asset".to_owned(), TypeKind::Struct(struct_idx));
        r
    }

    /// Build the full type graph for a contract (spec.md §4.1 item 3,
    /// "fill_contract"), grounded on `abieos.hpp::fill_contract`.
    pub fn fill_contract(abi: &AbiDefinition) -> Result<Self, AbiError> {
        let mut r = Self::with_builtins();

        let mut raw_structs: Vec<RawStructEntry> = vec![
            RawStructEntry { base: None, fields: vec![] }; r.structs.len()
        ];

        for t in &abi.types {
            if t.new_type_name.is_empty() {
                return Err(schema_err("abi has a type with a missing name"));
            }
            if r.by_name.contains_key(&t.new_type_name) || r.pending_aliases.contains_key(&t.new_type_name) {
                return Err(schema_err(format!(r#"abi redefines type "{}""#, t.new_type_name)));
            }
            r.pending_aliases.insert(t.new_type_name.clone(), t.type_.clone());
        }

        for s in &abi.structs {
            register_struct(&mut r, &mut raw_structs, s)?;
        }

        for v in &abi.variants {
            register_variant(&mut r, v)?;
        }

        let alias_names: Vec<String> = abi.types.iter().map(|t| t.new_type_name.clone()).collect();
        for new_type_name in alias_names {
            // already resolved (and removed from `pending_aliases`) by an
            // earlier iteration reaching it through some other type's fields
            if !r.pending_aliases.contains_key(&new_type_name) {
                continue;
            }
            r.get_type(&new_type_name, 0)?;
        }

        for idx in 0..r.structs.len() {
            r.fill_struct(&raw_structs, idx, 0)?;
        }
        for idx in 0..r.variants.len() {
            r.fill_variant(abi, idx, 0)?;
        }

        for node in &r.nodes {
            if let TypeKind::Alias(target) = node.kind {
                if matches!(r.nodes[target].kind, TypeKind::Extension(_)) {
                    return Err(schema_err("can't use extensions ($) within typedefs"));
                }
            }
        }

        for a in &abi.actions {
            let idx = r.get_type(&a.type_, 0)?;
            r.actions.insert(a.name.clone(), idx);
        }
        for t in &abi.tables {
            let idx = r.get_type(&t.type_, 0)?;
            r.tables.insert(t.name.clone(), idx);
        }

        Ok(r)
    }

    pub fn node(&self, idx: TypeIndex) -> &TypeNode {
        &self.nodes[idx]
    }

    pub fn struct_def(&self, idx: StructIndex) -> &StructDef {
        &self.structs[idx]
    }

    pub fn variant_def(&self, idx: VariantIndex) -> &VariantDef {
        &self.variants[idx]
    }

    pub fn action_type(&self, name: &str) -> Option<TypeIndex> {
        self.actions.get(name).copied()
    }

    pub fn table_type(&self, name: &str) -> Option<TypeIndex> {
        self.tables.get(name).copied()
    }

    /// Resolve a type name (possibly carrying `?`/`[]`/`$` suffixes) to its
    /// stable index, creating wrapper nodes on demand and memoizing them.
    pub fn get_type(&mut self, name: &str, depth: usize) -> Result<TypeIndex, AbiError> {
        if depth >= MAX_RESOLVE_DEPTH {
            return Err(schema_err("abi recursion limit reached"));
        }
        if let Some(&idx) = self.by_name.get(name) {
            return Ok(idx);
        }
        if let Some(target) = self.pending_aliases.get(name).cloned() {
            // not memoized before this resolves: a self-referential typedef
            // (`type_def{new: "t", type: "t"}`) re-derefs this same entry on
            // every recursive call until `depth` trips the guard above.
            let target_idx = self.get_type(&target, depth + 1)?;
            let idx = self.push_node(name.to_owned(), TypeKind::Alias(target_idx));
            self.pending_aliases.remove(name);
            return Ok(idx);
        }
        if let Some(base) = name.strip_suffix('?') {
            let inner = self.get_type(base, depth + 1)?;
            match &self.nodes[inner].kind {
                TypeKind::Optional(_) | TypeKind::Array(_) => {
                    return Err(schema_err("optional (?) and array ([]) don't support nesting"));
                },
                TypeKind::Extension(_) => {
                    return Err(schema_err("optional (?) may not contain binary extensions ($)"));
                },
                _ => {},
            }
            return Ok(self.push_node(name.to_owned(), TypeKind::Optional(inner)));
        }
        if let Some(base) = name.strip_suffix("[]") {
            let inner = self.get_type(base, depth + 1)?;
            match &self.nodes[inner].kind {
                TypeKind::Optional(_) | TypeKind::Array(_) => {
                    return Err(schema_err("optional (?) and array ([]) don't support nesting"));
                },
                TypeKind::Extension(_) => {
                    return Err(schema_err("array ([]) may not contain binary extensions ($)"));
                },
                _ => {},
            }
            return Ok(self.push_node(name.to_owned(), TypeKind::Array(inner)));
        }
        if let Some(base) = name.strip_suffix('$') {
            let inner = self.get_type(base, depth + 1)?;
            if let TypeKind::Extension(_) = &self.nodes[inner].kind {
                return Err(schema_err("binary extensions ($) may not contain binary extensions ($)"));
            }
            return Ok(self.push_node(name.to_owned(), TypeKind::Extension(inner)));
        }
        Err(schema_err(format!(r#"unknown type "{name}""#)))
    }

    /// Follow a chain of [`TypeKind::Alias`] nodes down to the underlying
    /// primitive/array/optional/extension/struct/variant node.
    pub fn fundamental(&self, mut idx: TypeIndex) -> TypeIndex {
        while let TypeKind::Alias(target) = self.nodes[idx].kind {
            idx = target;
        }
        idx
    }

    fn push_node(&mut self, name: String, kind: TypeKind) -> TypeIndex {
        let idx = self.nodes.len();
        self.nodes.push(TypeNode { name: name.clone(), kind });
        self.by_name.insert(name, idx);
        idx
    }

    fn fill_struct(&mut self, raw: &[RawStructEntry], idx: StructIndex, depth: usize) -> Result<(), AbiError> {
        if depth >= MAX_RESOLVE_DEPTH {
            return Err(schema_err("abi recursion limit reached"));
        }
        if self.structs[idx].filled {
            return Ok(());
        }
        let mut fields = vec![];
        if let Some(base_name) = raw[idx].base.clone() {
            let base_type_idx = self.get_type(&base_name, depth + 1)?;
            let base_struct_idx = match self.nodes[self.fundamental(base_type_idx)].kind {
                TypeKind::Struct(si) => si,
                _ => return Err(schema_err(format!(r#"base type "{base_name}" is not a struct"#))),
            };
            self.fill_struct(raw, base_struct_idx, depth + 1)?;
            fields.extend(self.structs[base_struct_idx].fields.clone());
        }
        for (field_name, type_name) in raw[idx].fields.clone() {
            let t = self.get_type(&type_name, depth + 1)?;
            fields.push((field_name, t));
        }
        self.structs[idx].fields = fields;
        self.structs[idx].filled = true;
        Ok(())
    }

    fn fill_variant(&mut self, abi: &AbiDefinition, idx: VariantIndex, depth: usize) -> Result<(), AbiError> {
        if depth >= MAX_RESOLVE_DEPTH {
            return Err(schema_err("abi recursion limit reached"));
        }
        if self.variants[idx].filled {
            return Ok(());
        }
        let name = self.variants[idx].name.clone();
        let raw: &RawVariant = abi
            .variants
            .iter()
            .find(|v| v.name == name)
            .expect("variant registered from this same abi.variants list");

        let mut types = vec![];
        for type_name in &raw.types {
            types.push(self.get_type(type_name, depth + 1)?);
        }
        self.variants[idx].types = types;
        self.variants[idx].filled = true;
        Ok(())
    }

    /// Parse and resolve the bootstrap schema used to decode the binary
    /// form of an `ABIDefinition` itself (spec.md §6).
    pub fn bootstrap() -> Result<Self, AbiError> {
        let abi = AbiDefinition::from_str(ABI_SCHEMA)
            .map_err(|e| schema_err(format!("malformed built-in ABI schema: {e}")))?;
        Self::fill_contract(&abi)
    }
}

fn register_struct(r: &mut Resolver, raw: &mut Vec<RawStructEntry>, s: &RawStruct) -> Result<(), AbiError> {
    if s.name.is_empty() {
        return Err(schema_err("abi has a struct with a missing name"));
    }
    if r.by_name.contains_key(&s.name) {
        return Err(schema_err(format!(r#"abi redefines type "{}""#, s.name)));
    }
    let struct_idx = r.structs.len();
    r.structs.push(StructDef { name: s.name.clone(), fields: vec![], filled: false });
    r.push_node(s.name.clone(), TypeKind::Struct(struct_idx));

    let base = if s.base.is_empty() { None } else { Some(s.base.clone()) };
    let fields = s.fields.iter().map(|f| (f.name.clone(), f.type_.clone())).collect();
    raw.push(RawStructEntry { base, fields });
    Ok(())
}

fn register_variant(r: &mut Resolver, v: &RawVariant) -> Result<(), AbiError> {
    if v.name.is_empty() {
        return Err(schema_err("abi has a variant with a missing name"));
    }
    if r.by_name.contains_key(&v.name) {
        return Err(schema_err(format!(r#"abi redefines type "{}""#, v.name)));
    }
    let variant_idx = r.variants.len();
    r.variants.push(VariantDef { name: v.name.clone(), types: vec![], filled: false });
    r.push_node(v.name.clone(), TypeKind::Variant(variant_idx));
    Ok(())
}
