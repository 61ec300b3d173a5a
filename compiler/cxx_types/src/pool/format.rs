//! C++ spelling of types.
//!
//! Types print in declarator order, so `Pointer(Function(int, [int]))` reads
//! `int (*)(int)` and a const pointer to `char` reads `char *const`.

use cxx_ir::Name;

use crate::{Cv, Idx, SymbolId, TemplateArg, TypeData, TypePool};

/// Names of identifiers and symbols, supplied by whoever owns the tables.
pub trait TypeNames {
    fn ident(&self, name: Name) -> String;
    fn symbol(&self, symbol: SymbolId) -> String;
}

impl TypePool {
    /// Spell `ty` as C++ source.
    pub fn display(&self, ty: Idx, names: &dyn TypeNames) -> String {
        self.declarator(ty, String::new(), names)
    }

    /// Spell a template argument list without the angle brackets.
    pub fn display_args(&self, args: &[TemplateArg], names: &dyn TypeNames) -> String {
        args.iter()
            .map(|arg| self.display_arg(arg, names))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn display_arg(&self, arg: &TemplateArg, names: &dyn TypeNames) -> String {
        match arg {
            TemplateArg::Type(ty) => self.display(*ty, names),
            TemplateArg::Value(value) => value.to_string(),
            TemplateArg::Template(sym) => names.symbol(*sym),
            TemplateArg::Pack(elems) => self.display_args(elems, names),
        }
    }

    fn declarator(&self, ty: Idx, inner: String, names: &dyn TypeNames) -> String {
        match self.get(ty) {
            TypeData::Pointer(pointee) => self.wrap(pointee, "*", inner, names),
            TypeData::LValueRef(referee) => self.wrap(referee, "&", inner, names),
            TypeData::RValueRef(referee) => self.wrap(referee, "&&", inner, names),
            TypeData::Qualified { inner: base, cv } => {
                if matches!(self.get(base), TypeData::Pointer(_)) {
                    let inner = if inner.is_empty() {
                        cv_spelling(cv).to_owned()
                    } else {
                        format!("{} {inner}", cv_spelling(cv))
                    };
                    self.declarator(base, inner, names)
                } else {
                    format!("{} {}", cv_spelling(cv), self.declarator(base, inner, names))
                }
            }
            TypeData::Array { elem, len } => {
                let bound = len.map(|n| n.to_string()).unwrap_or_default();
                self.declarator(elem, format!("{inner}[{bound}]"), names)
            }
            TypeData::Function(sig) => {
                let mut params: Vec<String> =
                    sig.params.iter().map(|&p| self.display(p, names)).collect();
                if sig.variadic {
                    params.push("...".to_owned());
                }
                self.declarator(sig.ret, format!("{inner}({})", params.join(", ")), names)
            }
            data => join(self.leaf(&data, names), &inner),
        }
    }

    /// Prefix `inner` with a pointer or reference operator, parenthesizing
    /// when the operand is a function or array.
    fn wrap(&self, operand: Idx, op: &str, inner: String, names: &dyn TypeNames) -> String {
        let inner = format!("{op}{inner}");
        match self.get(operand) {
            TypeData::Function(_) | TypeData::Array { .. } => {
                self.declarator(operand, format!("({inner})"), names)
            }
            _ => self.declarator(operand, inner, names),
        }
    }

    fn leaf(&self, data: &TypeData, names: &dyn TypeNames) -> String {
        match data {
            TypeData::Builtin(b) => b.spelling().to_owned(),
            TypeData::Class(sym) | TypeData::Enum(sym) | TypeData::Closure(sym) => {
                names.symbol(*sym)
            }
            TypeData::TemplateParam(param) => {
                if param.name.is_empty() {
                    format!("$T{}_{}", param.depth, param.index)
                } else {
                    names.ident(param.name)
                }
            }
            TypeData::ParamSpecialization { param, args } => {
                format!("{}<{}>", names.ident(param.name), self.display_args(args, names))
            }
            TypeData::Specialization { template, args } => {
                format!("{}<{}>", names.symbol(*template), self.display_args(args, names))
            }
            TypeData::DependentMember { scope, name } => {
                format!("{}::{}", self.display(*scope, names), names.ident(*name))
            }
            TypeData::PackExpansion(pattern) => format!("{}...", self.display(*pattern, names)),
            TypeData::Auto => "auto".to_owned(),
            TypeData::DecltypeAuto => "decltype(auto)".to_owned(),
            TypeData::Dependent => "<dependent>".to_owned(),
            TypeData::Problem(kind) => format!("<problem: {kind}>"),
            TypeData::Pointer(_)
            | TypeData::LValueRef(_)
            | TypeData::RValueRef(_)
            | TypeData::Qualified { .. }
            | TypeData::Array { .. }
            | TypeData::Function(_) => String::new(),
        }
    }
}

fn cv_spelling(cv: Cv) -> &'static str {
    match (cv.contains(Cv::CONST), cv.contains(Cv::VOLATILE)) {
        (true, true) => "const volatile",
        (true, false) => "const",
        (false, true) => "volatile",
        (false, false) => "",
    }
}

fn join(base: String, inner: &str) -> String {
    if inner.is_empty() {
        base
    } else if inner.starts_with('[') {
        format!("{base}{inner}")
    } else {
        format!("{base} {inner}")
    }
}
