//! Type interning for structural deduplication.
//!
//! This module implements the interning engine that converts `TypeData`
//! structures into lightweight `TypeId` handles.
//!
//! Benefits:
//! - O(1) type identity (just compare TypeId values)
//! - Memory efficient (each unique structure stored once)
//! - Cache-friendly (work with u32 handles instead of heap objects)

use crate::def::{ClassDef, ClassDefId, DefinitionStore, SymbolTable};
use crate::interner::{Atom, StringInterner};
use crate::types::*;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS; // 16 shards
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

struct TypeShard {
    key_to_index: RwLock<FxHashMap<TypeData, u32>>,
    index_to_key: RwLock<Vec<TypeData>>,
}

impl TypeShard {
    fn new() -> Self {
        TypeShard {
            key_to_index: RwLock::new(FxHashMap::default()),
            index_to_key: RwLock::new(Vec::new()),
        }
    }
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }

        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }

        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

fn sentinel_data(id: TypeId) -> Option<TypeData> {
    let kind = match id {
        TypeId::UNBOUND => TypeKind::Unbound,
        TypeId::UNKNOWN => TypeKind::Unknown,
        TypeId::ANY => TypeKind::Any,
        TypeId::NONE => TypeKind::None,
        TypeId::NEVER => TypeKind::Never,
        _ => return None,
    };
    Some(TypeData::new(
        kind,
        TypeFlags::INSTANCE | TypeFlags::INSTANTIABLE,
    ))
}

fn sentinel_id(data: &TypeData) -> Option<TypeId> {
    if data.alias.is_some() || data.condition.is_some() {
        return None;
    }
    if data.flags != TypeFlags::INSTANCE | TypeFlags::INSTANTIABLE {
        return None;
    }
    match data.kind {
        TypeKind::Unbound => Some(TypeId::UNBOUND),
        TypeKind::Unknown => Some(TypeId::UNKNOWN),
        TypeKind::Any => Some(TypeId::ANY),
        TypeKind::None => Some(TypeId::NONE),
        TypeKind::Never => Some(TypeId::NEVER),
        _ => None,
    }
}

/// Type interning table.
/// Thread-safe via RwLock-guarded shards for concurrent access.
pub struct TypeInterner {
    /// Sharded storage for non-sentinel types.
    shards: [TypeShard; SHARD_COUNT],
    /// String interner for names and qualified names.
    pub strings: StringInterner,
    type_lists: RwLock<SliceInterner<TypeId>>,
    tuple_lists: RwLock<SliceInterner<TupleTypeArg>>,
    class_shapes: RwLock<ValueInterner<ClassShape>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    type_var_shapes: RwLock<ValueInterner<TypeVarShape>>,
    module_shapes: RwLock<ValueInterner<ModuleShape>>,
    defs: DefinitionStore,
    /// Derivation caches: memoized instance / instantiable projections.
    /// Written at most once per key.
    instance_forms: RwLock<FxHashMap<TypeId, TypeId>>,
    instantiable_forms: RwLock<FxHashMap<TypeId, TypeId>>,
}

impl TypeInterner {
    pub fn new() -> Self {
        TypeInterner {
            shards: std::array::from_fn(|_| TypeShard::new()),
            strings: StringInterner::new(),
            type_lists: RwLock::new(SliceInterner::new()),
            tuple_lists: RwLock::new(SliceInterner::new()),
            class_shapes: RwLock::new(ValueInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            type_var_shapes: RwLock::new(ValueInterner::new()),
            module_shapes: RwLock::new(ValueInterner::new()),
            defs: DefinitionStore::new(),
            instance_forms: RwLock::new(FxHashMap::default()),
            instantiable_forms: RwLock::new(FxHashMap::default()),
        }
    }

    fn shard_of(data: &TypeData) -> u32 {
        let mut hasher = FxHasher::default();
        data.hash(&mut hasher);
        (hasher.finish() as u32) & SHARD_MASK
    }

    /// Intern a type record, returning its handle. Canonical sentinel
    /// records resolve to the fixed sentinel ids.
    pub fn intern_type(&self, data: TypeData) -> TypeId {
        if let Some(id) = sentinel_id(&data) {
            return id;
        }

        let shard_index = Self::shard_of(&data);
        let shard = &self.shards[shard_index as usize];

        {
            let key_map = shard.key_to_index.read().expect("type shard lock poisoned");
            if let Some(&index) = key_map.get(&data) {
                return Self::compose_id(shard_index, index);
            }
        }

        let mut key_map = shard.key_to_index.write().expect("type shard lock poisoned");
        if let Some(&index) = key_map.get(&data) {
            return Self::compose_id(shard_index, index);
        }
        let mut keys = shard.index_to_key.write().expect("type shard lock poisoned");
        let index = keys.len() as u32;
        keys.push(data.clone());
        key_map.insert(data, index);
        Self::compose_id(shard_index, index)
    }

    fn compose_id(shard: u32, index: u32) -> TypeId {
        TypeId(TypeId::FIRST_USER + ((index << SHARD_BITS) | shard))
    }

    /// Look up the record behind a handle. Sentinels resolve to their
    /// canonical records; an invalid handle resolves to `Unknown`.
    pub fn type_data(&self, id: TypeId) -> TypeData {
        if let Some(data) = sentinel_data(id) {
            return data;
        }
        if id.0 < TypeId::FIRST_USER {
            return sentinel_data(TypeId::UNKNOWN).unwrap();
        }
        let raw = id.0 - TypeId::FIRST_USER;
        let shard = &self.shards[(raw & SHARD_MASK) as usize];
        let keys = shard.index_to_key.read().expect("type shard lock poisoned");
        keys.get((raw >> SHARD_BITS) as usize)
            .cloned()
            .unwrap_or_else(|| sentinel_data(TypeId::UNKNOWN).unwrap())
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.strings.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.strings.resolve(atom)
    }

    pub fn intern_type_list(&self, items: Vec<TypeId>) -> TypeListId {
        let mut lists = self.type_lists.write().expect("type_lists lock poisoned");
        TypeListId(lists.intern(items))
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().expect("type_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    pub fn intern_tuple_list(&self, items: Vec<TupleTypeArg>) -> TupleListId {
        let mut lists = self.tuple_lists.write().expect("tuple_lists lock poisoned");
        TupleListId(lists.intern(items))
    }

    pub fn tuple_list(&self, id: TupleListId) -> Arc<[TupleTypeArg]> {
        let lists = self.tuple_lists.read().expect("tuple_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    pub fn intern_class_shape(&self, shape: ClassShape) -> ClassId {
        let mut shapes = self.class_shapes.write().expect("class_shapes lock poisoned");
        ClassId(shapes.intern(shape))
    }

    pub fn class_shape(&self, id: ClassId) -> Arc<ClassShape> {
        self.class_shapes
            .read()
            .expect("class_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| Arc::new(ClassShape::unspecialized(ClassDefId::INVALID)))
    }

    pub fn intern_function_shape(&self, shape: FunctionShape) -> FunctionId {
        let mut shapes = self
            .function_shapes
            .write()
            .expect("function_shapes lock poisoned");
        FunctionId(shapes.intern(shape))
    }

    pub fn function_shape(&self, id: FunctionId) -> Arc<FunctionShape> {
        self.function_shapes
            .read()
            .expect("function_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| Arc::new(FunctionShape::new(Atom::NONE, Vec::new(), None)))
    }

    pub fn intern_type_var_shape(&self, shape: TypeVarShape) -> TypeVarId {
        let mut shapes = self
            .type_var_shapes
            .write()
            .expect("type_var_shapes lock poisoned");
        TypeVarId(shapes.intern(shape))
    }

    pub fn type_var_shape(&self, id: TypeVarId) -> Arc<TypeVarShape> {
        self.type_var_shapes
            .read()
            .expect("type_var_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| Arc::new(TypeVarShape::plain(Atom::NONE, None)))
    }

    pub fn intern_module_shape(&self, shape: ModuleShape) -> ModuleId {
        let mut shapes = self
            .module_shapes
            .write()
            .expect("module_shapes lock poisoned");
        ModuleId(shapes.intern(shape))
    }

    pub fn module_shape(&self, id: ModuleId) -> Arc<ModuleShape> {
        self.module_shapes
            .read()
            .expect("module_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| Arc::new(ModuleShape { name: Atom::NONE }))
    }

    pub fn register_class(&self, def: ClassDef) -> ClassDefId {
        self.defs.register(def)
    }

    pub fn class_def(&self, id: ClassDefId) -> Arc<ClassDef> {
        self.defs.get(id)
    }

    pub fn set_class_fields(&self, id: ClassDefId, fields: SymbolTable) {
        self.defs.update_fields(id, fields);
    }

    pub fn set_base_classes(&self, id: ClassDefId, base_classes: Vec<TypeId>) {
        self.defs.update_base_classes(id, base_classes);
    }

    pub fn set_type_params(&self, id: ClassDefId, type_params: Vec<TypeId>) {
        self.defs.update_type_params(id, type_params);
    }

    pub fn class_mro(&self, id: ClassDefId) -> Option<Arc<[TypeId]>> {
        self.defs.mro(id)
    }

    pub fn set_class_mro(&self, id: ClassDefId, mro: Vec<TypeId>) -> Arc<[TypeId]> {
        self.defs.set_mro(id, mro)
    }

    pub fn cached_instance_form(&self, id: TypeId) -> Option<TypeId> {
        self.instance_forms
            .read()
            .expect("instance_forms lock poisoned")
            .get(&id)
            .copied()
    }

    pub fn cache_instance_form(&self, id: TypeId, instance: TypeId) {
        self.instance_forms
            .write()
            .expect("instance_forms lock poisoned")
            .entry(id)
            .or_insert(instance);
    }

    pub fn cached_instantiable_form(&self, id: TypeId) -> Option<TypeId> {
        self.instantiable_forms
            .read()
            .expect("instantiable_forms lock poisoned")
            .get(&id)
            .copied()
    }

    pub fn cache_instantiable_form(&self, id: TypeId, instantiable: TypeId) {
        self.instantiable_forms
            .write()
            .expect("instantiable_forms lock poisoned")
            .entry(id)
            .or_insert(instantiable);
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/intern_tests.rs"]
mod tests;
