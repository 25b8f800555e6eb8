//! Type formatting.
//! Centralizes logic for converting type handles to human-readable
//! strings for tracing output and test failure messages.

use crate::db::TypeDatabase;
use crate::types::*;

/// Context for generating type strings.
pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
    /// Maximum depth for nested type printing.
    max_depth: u32,
    /// Maximum number of union members to display before truncating.
    max_union_members: usize,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        TypeFormatter {
            db,
            max_depth: 5,
            max_union_members: 8,
        }
    }

    pub fn format(&self, ty: TypeId) -> String {
        self.format_at(ty, 0)
    }

    fn format_at(&self, ty: TypeId, depth: u32) -> String {
        if depth > self.max_depth {
            return "...".to_string();
        }
        let data = self.db.type_data(ty);
        match data.kind {
            TypeKind::Unbound => "Unbound".to_string(),
            TypeKind::Unknown => "Unknown".to_string(),
            TypeKind::Any => "Any".to_string(),
            TypeKind::None => "None".to_string(),
            TypeKind::Never => "Never".to_string(),
            TypeKind::Module(module_id) => {
                let shape = self.db.module_shape(module_id);
                format!("Module(\"{}\")", self.db.resolve_atom(shape.name))
            }
            TypeKind::TypeVar(tv) => {
                let shape = self.db.type_var_shape(tv);
                let name = self.db.resolve_atom(shape.name);
                match shape.access {
                    Some(ParamSpecAccess::Args) => format!("{name}.args"),
                    Some(ParamSpecAccess::Kwargs) => format!("{name}.kwargs"),
                    None if shape.kind == TypeVarKind::Variadic
                        && shape.is_variadic_unpacked =>
                    {
                        format!("*{name}")
                    }
                    None => name.to_string(),
                }
            }
            TypeKind::Union { members, .. } => {
                let member_list = self.db.type_list(members);
                let mut parts: Vec<String> = member_list
                    .iter()
                    .take(self.max_union_members)
                    .map(|&member| self.format_at(member, depth + 1))
                    .collect();
                if member_list.len() > self.max_union_members {
                    parts.push(format!("... +{}", member_list.len() - self.max_union_members));
                }
                parts.join(" | ")
            }
            TypeKind::Class(class_id) => self.format_class(class_id, &data, depth),
            TypeKind::Function(fn_id) => self.format_function(fn_id, depth),
            TypeKind::Overloaded(list) => {
                let overloads = self.db.type_list(list);
                let parts: Vec<String> = overloads
                    .iter()
                    .map(|&overload| self.format_at(overload, depth + 1))
                    .collect();
                format!("Overload[{}]", parts.join(", "))
            }
        }
    }

    fn format_class(&self, class_id: ClassId, data: &TypeData, depth: u32) -> String {
        let shape = self.db.class_shape(class_id);
        let def = self.db.class_def(shape.def);
        let name = self.db.resolve_atom(def.name);

        if let Some(literal) = &shape.literal {
            let value = match literal {
                LiteralValue::Int(value) => value.to_string(),
                LiteralValue::Bool(true) => "True".to_string(),
                LiteralValue::Bool(false) => "False".to_string(),
                LiteralValue::Str(atom) => format!("'{}'", self.db.resolve_atom(*atom)),
                LiteralValue::Bytes(atom) => format!("b'{}'", self.db.resolve_atom(*atom)),
                LiteralValue::EnumMember(atom) => {
                    format!("{name}.{}", self.db.resolve_atom(*atom))
                }
            };
            return format!("Literal[{value}]");
        }

        let mut rendered = if let Some(tuple_args) = &shape.tuple_type_args {
            let parts: Vec<String> = tuple_args
                .iter()
                .map(|entry| {
                    let element = self.format_at(entry.ty, depth + 1);
                    if entry.is_unbounded {
                        format!("{element}, ...")
                    } else {
                        element
                    }
                })
                .collect();
            format!("{name}[{}]", parts.join(", "))
        } else if let Some(args) = &shape.type_args {
            let parts: Vec<String> = args
                .iter()
                .map(|&arg| self.format_at(arg, depth + 1))
                .collect();
            format!("{name}[{}]", parts.join(", "))
        } else {
            name.to_string()
        };

        if shape.is_unpacked {
            rendered = format!("*{rendered}");
        }
        if data.flags == TypeFlags::INSTANTIABLE {
            rendered = format!("type[{rendered}]");
        }
        rendered
    }

    fn format_function(&self, fn_id: FunctionId, depth: u32) -> String {
        let shape = self.db.function_shape(fn_id);
        let mut parts: Vec<String> = Vec::with_capacity(shape.params.len());
        for (i, param) in shape.params.iter().enumerate() {
            if param.is_keyword_separator() {
                parts.push("*".to_string());
                continue;
            }
            if param.is_position_only_separator() {
                parts.push("/".to_string());
                continue;
            }
            let prefix = match param.category {
                ParamCategory::ArgsList => "*",
                ParamCategory::KwargsDict => "**",
                ParamCategory::Simple => "",
            };
            let name = param
                .name
                .map(|atom| self.db.resolve_atom(atom).to_string())
                .unwrap_or_default();
            let ty = self.format_at(shape.effective_param_type(i), depth + 1);
            parts.push(format!("{prefix}{name}: {ty}"));
        }
        if let Some(param_spec) = shape.param_spec {
            parts.push(format!("**{}", self.format_at(param_spec, depth + 1)));
        }
        let return_type = shape
            .effective_return_type()
            .map(|ret| self.format_at(ret, depth + 1))
            .unwrap_or_else(|| "Unknown".to_string());
        format!("({}) -> {return_type}", parts.join(", "))
    }
}

/// One-shot convenience formatter.
pub fn format_type(db: &dyn TypeDatabase, ty: TypeId) -> String {
    TypeFormatter::new(db).format(ty)
}
