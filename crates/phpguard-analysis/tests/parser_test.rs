//! PHP parser adapter and CST lowering.

use phpguard_analysis::parsers::ast::Param;
use phpguard_analysis::{NodeKind, PhpParser};
use phpguard_core::ParseError;

fn parse(src: &str) -> phpguard_analysis::ParsedTree {
    PhpParser::new().parse(src).unwrap()
}

#[test]
fn lowers_declarations() {
    let tree = parse(
        "<?php\nnamespace App\\Models;\n\nabstract class User extends Model implements Countable\n{\n    const TABLE = 'users';\n    private $name;\n\n    public static function make(string $name, ...$rest)\n    {\n        return new static();\n    }\n}\n",
    );
    let root = tree.root();

    let ns = root.find_first(|n| matches!(n.kind, NodeKind::Namespace { .. })).unwrap();
    assert_eq!(ns.kind.name(), Some("App\\Models"));

    let class = root.find_first(|n| matches!(n.kind, NodeKind::Class { .. })).unwrap();
    match &class.kind {
        NodeKind::Class {
            name,
            extends,
            implements,
            is_abstract,
        } => {
            assert_eq!(name, "User");
            assert_eq!(extends.as_deref(), Some("Model"));
            assert_eq!(implements, &vec!["Countable".to_string()]);
            assert!(*is_abstract);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(class.line, 4);

    let method = root.find_first(|n| matches!(n.kind, NodeKind::Method { .. })).unwrap();
    match &method.kind {
        NodeKind::Method {
            name,
            is_static,
            params,
            ..
        } => {
            assert_eq!(name, "make");
            assert!(*is_static);
            assert_eq!(
                params,
                &vec![
                    Param {
                        name: "name".into(),
                        type_hint: Some("string".into()),
                        is_variadic: false,
                        is_promoted: false,
                    },
                    Param {
                        name: "rest".into(),
                        type_hint: None,
                        is_variadic: true,
                        is_promoted: false,
                    },
                ]
            );
        }
        other => panic!("unexpected {other:?}"),
    }

    assert!(root.find_first(|n| n.kind == NodeKind::ClassConstant { name: "TABLE".into() }).is_some());
    assert!(root.find_first(|n| n.kind == NodeKind::Property { name: "name".into() }).is_some());
}

#[test]
fn lowers_imports_including_groups_and_aliases() {
    let tree = parse("<?php\nuse MongoDB\\Client;\nuse Illuminate\\Support\\Facades\\DB as Database;\nuse App\\Models\\{User, Post as Article};\n");
    let uses: Vec<(String, Option<String>)> = tree
        .root()
        .descendants()
        .filter_map(|n| match &n.kind {
            NodeKind::Use { name, alias } => Some((name.clone(), alias.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        uses,
        vec![
            ("MongoDB\\Client".to_string(), None),
            ("Illuminate\\Support\\Facades\\DB".to_string(), Some("Database".to_string())),
            ("App\\Models\\User".to_string(), None),
            ("App\\Models\\Post".to_string(), Some("Article".to_string())),
        ]
    );
}

#[test]
fn lowers_calls() {
    let tree = parse("<?php\n$u = new User();\n$u->save();\nUser::find(1);\ndd($u);\n");
    let kinds: Vec<&NodeKind> = tree
        .root()
        .descendants()
        .map(|n| &n.kind)
        .filter(|k| {
            matches!(
                k,
                NodeKind::New { .. }
                    | NodeKind::MethodCall { .. }
                    | NodeKind::StaticCall { .. }
                    | NodeKind::FunctionCall { .. }
            )
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            &NodeKind::New { class: "User".into() },
            &NodeKind::MethodCall { method: "save".into() },
            &NodeKind::StaticCall {
                class: "User".into(),
                method: "find".into()
            },
            &NodeKind::FunctionCall { name: "dd".into() },
        ]
    );
}

#[test]
fn syntax_error_reports_a_line() {
    let err = PhpParser::new()
        .parse("<?php\nclass A\n{\n    public function f(\n    {\n    }\n}\n")
        .unwrap_err();
    match &err {
        ParseError::Syntax { message, line } => {
            assert!(message.starts_with("syntax error"), "{message}");
            assert!((1..=7).contains(line));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(err.line() >= 1);
}

#[test]
fn unusual_but_valid_syntax_parses() {
    let src = "<?php\n$f = fn($x) => $x * 2;\n$m = match(true) { default => 1 };\n$a = [...$b, 'k' => $c ?? null];\nenum Suit: string { case Hearts = 'H'; }\n#[Attr]\nfunction g(int|string $v): never { throw new E(); }\n";
    let tree = parse(src);
    assert!(tree
        .root()
        .find_first(|n| matches!(n.kind, NodeKind::Closure { .. }))
        .is_some());
    assert!(tree
        .root()
        .find_first(|n| n.kind == NodeKind::Enum { name: "Suit".into() })
        .is_some());
}

#[test]
fn parsing_is_pure() {
    let src = "<?php\nclass A { public function b() { return c(); } }\n";
    assert_eq!(parse(src), parse(src));
}
