//! Built-in subset of the `java.lang` and `java.util` packages.
//!
//! Overloads are listed most specific first; method lookup takes the
//! first applicable signature.

use crate::symbol::ClassSymbol;
use crate::types::Type;

fn t(name: &str) -> Type {
    Type::class(name)
}

fn v(name: &str) -> Type {
    Type::var(name)
}

fn string() -> Type {
    Type::string()
}

fn object() -> Type {
    Type::object()
}

fn comparable(of: Type) -> Type {
    Type::generic("java.lang.Comparable", vec![of])
}

fn boxed(name: &str, prim: Type, value_method: &str) -> ClassSymbol {
    ClassSymbol::new(name)
        .extends(t("java.lang.Number"))
        .implements(comparable(t(name)))
        .method(value_method, vec![], prim.clone())
        .method("compareTo", vec![t(name)], Type::int())
        .static_method("valueOf", vec![prim.clone()], t(name))
        .static_method("compare", vec![prim.clone(), prim.clone()], Type::int())
        .static_field("MAX_VALUE", prim.clone())
        .static_field("MIN_VALUE", prim)
}

pub(crate) fn classes() -> Vec<ClassSymbol> {
    vec![
        ClassSymbol::new("java.lang.Object")
            .method("equals", vec![object()], Type::boolean())
            .method("hashCode", vec![], Type::int())
            .method("toString", vec![], string()),
        ClassSymbol::new("java.lang.Cloneable").interface(),
        ClassSymbol::new("java.io.Serializable").interface(),
        ClassSymbol::new("java.lang.CharSequence")
            .interface()
            .method("length", vec![], Type::int())
            .method("charAt", vec![Type::int()], Type::char_())
            .method("isEmpty", vec![], Type::boolean()),
        ClassSymbol::new("java.lang.Comparable")
            .interface()
            .type_params(&["T"])
            .method("compareTo", vec![v("T")], Type::int()),
        ClassSymbol::new("java.lang.String")
            .implements(t("java.lang.CharSequence"))
            .implements(comparable(string()))
            .implements(t("java.io.Serializable"))
            .method("length", vec![], Type::int())
            .method("isEmpty", vec![], Type::boolean())
            .method("charAt", vec![Type::int()], Type::char_())
            .method("equalsIgnoreCase", vec![string()], Type::boolean())
            .method("contains", vec![t("java.lang.CharSequence")], Type::boolean())
            .method("startsWith", vec![string()], Type::boolean())
            .method("endsWith", vec![string()], Type::boolean())
            .method("indexOf", vec![string()], Type::int())
            .method("substring", vec![Type::int()], string())
            .method("substring", vec![Type::int(), Type::int()], string())
            .method("trim", vec![], string())
            .method("toUpperCase", vec![], string())
            .method("toLowerCase", vec![], string())
            .method("concat", vec![string()], string())
            .method("compareTo", vec![string()], Type::int())
            .static_method("valueOf", vec![Type::int()], string())
            .static_method("valueOf", vec![object()], string()),
        ClassSymbol::new("java.lang.Number")
            .implements(t("java.io.Serializable"))
            .method("intValue", vec![], Type::int())
            .method("longValue", vec![], Type::long())
            .method("doubleValue", vec![], Type::double()),
        boxed("java.lang.Integer", Type::int(), "intValue")
            .static_method("parseInt", vec![string()], Type::int()),
        boxed("java.lang.Long", Type::long(), "longValue")
            .static_method("parseLong", vec![string()], Type::long()),
        boxed("java.lang.Double", Type::double(), "doubleValue")
            .static_method("parseDouble", vec![string()], Type::double()),
        boxed(
            "java.lang.Float",
            Type::prim(crate::PrimKind::Float),
            "floatValue",
        ),
        boxed(
            "java.lang.Short",
            Type::prim(crate::PrimKind::Short),
            "shortValue",
        ),
        boxed(
            "java.lang.Byte",
            Type::prim(crate::PrimKind::Byte),
            "byteValue",
        ),
        ClassSymbol::new("java.lang.Boolean")
            .implements(comparable(t("java.lang.Boolean")))
            .implements(t("java.io.Serializable"))
            .method("booleanValue", vec![], Type::boolean())
            .static_method("valueOf", vec![Type::boolean()], t("java.lang.Boolean"))
            .static_method("parseBoolean", vec![string()], Type::boolean())
            .static_field("TRUE", t("java.lang.Boolean"))
            .static_field("FALSE", t("java.lang.Boolean")),
        ClassSymbol::new("java.lang.Character")
            .implements(comparable(t("java.lang.Character")))
            .method("charValue", vec![], Type::char_())
            .static_method("valueOf", vec![Type::char_()], t("java.lang.Character"))
            .static_method("isDigit", vec![Type::char_()], Type::boolean()),
        ClassSymbol::new("java.lang.Math")
            .static_method("abs", vec![Type::int()], Type::int())
            .static_method("abs", vec![Type::long()], Type::long())
            .static_method("abs", vec![Type::double()], Type::double())
            .static_method("max", vec![Type::int(), Type::int()], Type::int())
            .static_method("max", vec![Type::long(), Type::long()], Type::long())
            .static_method("max", vec![Type::double(), Type::double()], Type::double())
            .static_method("min", vec![Type::int(), Type::int()], Type::int())
            .static_method("min", vec![Type::long(), Type::long()], Type::long())
            .static_method("min", vec![Type::double(), Type::double()], Type::double())
            .static_method("sqrt", vec![Type::double()], Type::double()),
        ClassSymbol::new("java.lang.System")
            .static_field("out", t("java.io.PrintStream"))
            .static_field("err", t("java.io.PrintStream"))
            .static_method("currentTimeMillis", vec![], Type::long()),
        ClassSymbol::new("java.io.PrintStream")
            .method("println", vec![], Type::void())
            .method("println", vec![Type::boolean()], Type::void())
            .method("println", vec![Type::char_()], Type::void())
            .method("println", vec![Type::int()], Type::void())
            .method("println", vec![Type::long()], Type::void())
            .method("println", vec![Type::double()], Type::void())
            .method("println", vec![string()], Type::void())
            .method("println", vec![object()], Type::void()),
        ClassSymbol::new("java.util.Objects")
            .static_method("equals", vec![object(), object()], Type::boolean())
            .static_method("hashCode", vec![object()], Type::int())
            .static_method("isNull", vec![object()], Type::boolean())
            .static_method("nonNull", vec![object()], Type::boolean())
            .static_method("toString", vec![object()], string())
            .static_method("requireNonNull", vec![object()], object()),
        ClassSymbol::new("java.util.Collection")
            .interface()
            .type_params(&["E"])
            .method("size", vec![], Type::int())
            .method("isEmpty", vec![], Type::boolean())
            .method("contains", vec![object()], Type::boolean())
            .method("add", vec![v("E")], Type::boolean())
            .method("remove", vec![object()], Type::boolean()),
        ClassSymbol::new("java.util.List")
            .interface()
            .type_params(&["E"])
            .implements(Type::generic("java.util.Collection", vec![v("E")]))
            .method("get", vec![Type::int()], v("E"))
            .method("set", vec![Type::int(), v("E")], v("E"))
            .method("indexOf", vec![object()], Type::int()),
        ClassSymbol::new("java.util.ArrayList")
            .type_params(&["E"])
            .implements(Type::generic("java.util.List", vec![v("E")])),
        ClassSymbol::new("java.util.Set")
            .interface()
            .type_params(&["E"])
            .implements(Type::generic("java.util.Collection", vec![v("E")])),
        ClassSymbol::new("java.util.HashSet")
            .type_params(&["E"])
            .implements(Type::generic("java.util.Set", vec![v("E")])),
        ClassSymbol::new("java.util.Map")
            .interface()
            .type_params(&["K", "V"])
            .method("get", vec![object()], v("V"))
            .method("put", vec![v("K"), v("V")], v("V"))
            .method("containsKey", vec![object()], Type::boolean())
            .method("size", vec![], Type::int())
            .method("isEmpty", vec![], Type::boolean()),
        ClassSymbol::new("java.util.Map.Entry")
            .interface()
            .type_params(&["K", "V"])
            .method("getKey", vec![], v("K"))
            .method("getValue", vec![], v("V")),
        ClassSymbol::new("java.util.HashMap")
            .type_params(&["K", "V"])
            .implements(Type::generic("java.util.Map", vec![v("K"), v("V")])),
    ]
}
