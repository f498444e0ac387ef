use pretty_assertions::assert_eq;
use refit_ast::ast::{Member, Stmt, TypeExprKind};
use refit_ast::pretty::Pretty;
use refit_parse::parse_str;

const SRC: &str = r#"
package com.example;

import java.util.List;
import java.util.*;

public class Counter {
    private static int total = 0;
    List<List<String>> rows;

    public int count(int[] xs, int limit) {
        int n = 0;
        while (n < limit) {
            if (xs[n] > 0) {
                n++;
            } else return n;
        }
        return n;
    }
}
"#;

#[test]
fn header_declarations() {
    let unit = parse_str("<test>", SRC).expect("parse failed");
    assert_eq!(unit.package_name(), "com.example");
    assert_eq!(unit.imports.len(), 2);
    assert_eq!(unit.imports[0].name.text(), "java.util.List");
    assert!(!unit.imports[0].on_demand);
    assert!(unit.imports[1].on_demand);
    assert_eq!(unit.classes[0].name.text, "Counter");
}

#[test]
fn nested_type_arguments_close_with_single_angles() {
    let unit = parse_str("<test>", SRC).expect("parse failed");
    let Member::Field(rows) = &unit.classes[0].members[1] else {
        panic!("expected field");
    };
    let TypeExprKind::Named { path, args, .. } = &rows.ty.kind else {
        panic!("expected named type");
    };
    assert_eq!(path, &vec!["List".to_string()]);
    assert!(matches!(&args[0].kind, TypeExprKind::Named { args, .. } if args.len() == 1));
}

#[test]
fn method_body_prints_back() {
    let unit = parse_str("<test>", SRC).expect("parse failed");
    let Member::Method(m) = &unit.classes[0].members[2] else {
        panic!("expected method");
    };
    let mut out = String::new();
    Pretty::new(&mut out).print_block(&m.body).unwrap();
    assert_eq!(
        out,
        "{\n  int n = 0;\n  while (n < limit) {\n    if (xs[n] > 0) {\n      n++;\n    } else return n;\n  }\n  return n;\n}"
    );
}

#[test]
fn local_declarations_and_expression_statements() {
    let unit = parse_str(
        "<test>",
        "class A { void m(java.util.List<String> a) { java.util.List<String> b = a; a.size(); b = a; } }",
    )
    .expect("parse failed");
    let Member::Method(m) = &unit.classes[0].members[0] else {
        panic!("expected method");
    };
    assert!(matches!(m.body.stmts[0], Stmt::Local { .. }));
    assert!(matches!(m.body.stmts[1], Stmt::Expr { .. }));
    assert!(matches!(m.body.stmts[2], Stmt::Expr { .. }));
}
