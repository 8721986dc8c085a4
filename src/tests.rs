//! Crate-level tests running both front ends through the formatter
//! against a small Northwind-shaped entity model.

pub mod northwind {
    use crate::format::MetadataLookup;

    /// Products and Categories with a navigation each way. Lookups are
    /// case-insensitive so tests can exercise exact-casing.
    pub struct Northwind;

    fn properties(collection: &str) -> &'static [&'static str] {
        match collection {
            "Products" => &[
                "ProductID",
                "ProductName",
                "UnitPrice",
                "UnitsInStock",
                "Discontinued",
                "CategoryID",
            ],
            "Categories" => &["CategoryID", "CategoryName"],
            _ => &[],
        }
    }

    // (navigation name, partner collection)
    fn navigations(collection: &str) -> &'static [(&'static str, &'static str)] {
        match collection {
            "Products" => &[("Category", "Categories")],
            "Categories" => &[("Products", "Products")],
            _ => &[],
        }
    }

    impl MetadataLookup for Northwind {
        fn is_structural_property(&self, collection: &str, name: &str) -> bool {
            properties(collection)
                .iter()
                .any(|p| p.eq_ignore_ascii_case(name))
        }

        fn is_navigation_property(&self, collection: &str, name: &str) -> bool {
            navigations(collection)
                .iter()
                .any(|(n, _)| n.eq_ignore_ascii_case(name))
        }

        fn exact_property_name(&self, collection: &str, name: &str) -> Option<String> {
            properties(collection)
                .iter()
                .find(|p| p.eq_ignore_ascii_case(name))
                .map(|p| p.to_string())
        }

        fn exact_navigation_name(&self, collection: &str, name: &str) -> Option<String> {
            navigations(collection)
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(n, _)| n.to_string())
        }

        fn partner_collection(&self, collection: &str, navigation: &str) -> Option<String> {
            navigations(collection)
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(navigation))
                .map(|(_, partner)| partner.to_string())
        }
    }
}

use crate::ast::Expr;
use crate::dynamic::DynamicExpr;
use crate::error::Error;
use crate::format::{FormatContext, format};
use crate::functions::ODataVersion;
use crate::key_lookup::{KeyMap, extract};
use crate::literal::DefaultLiteralFormatter;
use crate::typed::{self, NoCaptures, SourceBinaryOp, SourceExpr};
use northwind::Northwind;

fn it() -> DynamicExpr {
    DynamicExpr::root()
}

fn render(expr: &Expr, version: ODataVersion) -> Result<String, Error> {
    let literals = DefaultLiteralFormatter::new(version);
    let cx = FormatContext::new(&Northwind, &literals, version, "Products");
    format(expr, &cx)
}

fn render_v3(expr: &Expr) -> String {
    render(expr, ODataVersion::V3).unwrap()
}

#[test]
fn precedence_groups_looser_child() {
    let expr = it()
        .member("CategoryID")
        .eq(1i64)
        .or(it().member("CategoryID").eq(2i64))
        .and(it().member("ProductName").eq("Chai"))
        .into_expr();
    assert_eq!(
        render_v3(&expr),
        "(CategoryID eq 1 or CategoryID eq 2) and ProductName eq 'Chai'"
    );
}

#[test]
fn precedence_leaves_tighter_child_ungrouped() {
    // and-of-or groups; or-of-and does not.
    let expr = it()
        .member("CategoryID")
        .eq(1i64)
        .and(it().member("Discontinued").eq(false))
        .or(it().member("CategoryID").eq(2i64))
        .into_expr();
    assert_eq!(
        render_v3(&expr),
        "CategoryID eq 1 and Discontinued eq false or CategoryID eq 2"
    );
}

#[test]
fn arithmetic_precedence() {
    // (UnitPrice add 5) mul 2: Add binds looser than Mul, so it groups.
    let grouped = it()
        .member("UnitPrice")
        .add(5i64)
        .mul(2i64)
        .into_expr();
    assert_eq!(render_v3(&grouped), "(UnitPrice add 5) mul 2");

    // UnitPrice mul 2 add 5 needs no parentheses either way.
    let flat = it()
        .member("UnitPrice")
        .mul(2i64)
        .add(5i64)
        .into_expr();
    assert_eq!(render_v3(&flat), "UnitPrice mul 2 add 5");
}

#[test]
fn containment_dispatch_per_generation() {
    let expr = it()
        .member("ProductName")
        .call("Contains", vec!["ai".into()])
        .into_expr();
    assert_eq!(
        render(&expr, ODataVersion::V3).unwrap(),
        "substringof('ai',ProductName)"
    );
    assert_eq!(
        render(&expr, ODataVersion::V4).unwrap(),
        "contains(ProductName,'ai')"
    );
}

#[test]
fn substring_keeps_declared_argument_order() {
    let expr = it()
        .member("ProductName")
        .call("Substring", vec![1i64.into(), 2i64.into()])
        .into_expr();
    assert_eq!(render_v3(&expr), "substring(ProductName,1,2)");
}

#[test]
fn unregistered_function_is_rejected() {
    let expr = it()
        .member("ProductName")
        .call("Reverse", vec![])
        .into_expr();
    assert_eq!(
        render(&expr, ODataVersion::V4).unwrap_err(),
        Error::UnsupportedFunction {
            name: "Reverse".into(),
            arity: 0
        }
    );
}

#[test]
fn not_groups_operator_operand() {
    let expr = it().member("ProductName").eq("Chai").not().into_expr();
    assert_eq!(render_v3(&expr), "not(ProductName eq 'Chai')");
}

#[test]
fn not_leaves_leaf_operand_bare() {
    let expr = it().member("Discontinued").not().into_expr();
    assert_eq!(render_v3(&expr), "not Discontinued");
}

#[test]
fn negation_renders_with_dash() {
    let expr = it().member("CategoryID").neg().into_expr();
    assert_eq!(render_v3(&expr), "-CategoryID");

    let grouped = it().member("CategoryID").add(1i64).neg().into_expr();
    assert_eq!(render_v3(&grouped), "-(CategoryID add 1)");
}

#[test]
fn typed_front_end_formats_identically() {
    let source = SourceExpr::binary(
        SourceExpr::call(
            SourceExpr::member(SourceExpr::Parameter, "ProductName"),
            "Contains",
            vec![SourceExpr::constant("ai")],
        ),
        SourceBinaryOp::And,
        SourceExpr::binary(
            SourceExpr::member(SourceExpr::Parameter, "UnitPrice"),
            SourceBinaryOp::Lt,
            SourceExpr::constant(20i64),
        ),
    );
    let typed = typed::parse(&source, &NoCaptures).unwrap();
    let dynamic = it()
        .member("ProductName")
        .call("Contains", vec!["ai".into()])
        .and(it().member("UnitPrice").lt(20i64))
        .into_expr();

    assert_eq!(render_v3(&typed), render_v3(&dynamic));
    assert_eq!(
        render_v3(&typed),
        "substringof('ai',ProductName) and UnitPrice lt 20"
    );
}

#[test]
fn three_level_navigation_resolves() {
    let expr = it()
        .member("Category")
        .member("Products")
        .member("Category")
        .member("CategoryName")
        .eq("Beverages")
        .into_expr();
    assert_eq!(
        render_v3(&expr),
        "Category/Products/Category/CategoryName eq 'Beverages'"
    );
}

#[test]
fn date_part_member_formats_through_mapping() {
    let expr = it().member("BirthDate").member("Day").eq(8i64).into_expr();
    let literals = DefaultLiteralFormatter::new(ODataVersion::V3);
    let cx = FormatContext::new(&Northwind, &literals, ODataVersion::V3, "Employees");
    // Employees is not in the model, so BirthDate resolves nowhere and the
    // walk fails on the first segment.
    assert!(matches!(
        format(&expr, &cx),
        Err(Error::UnresolvableReference { .. })
    ));

    let nameless = FormatContext::nameless(&Northwind, &literals, ODataVersion::V3);
    assert_eq!(format(&expr, &nameless).unwrap(), "day(BirthDate) eq 8");
}

#[test]
fn formatting_is_idempotent() {
    let expr = it()
        .member("ProductName")
        .call("Contains", vec!["ai".into()])
        .or(it().member("UnitPrice").ge(10.5f64))
        .into_expr();
    let first = render_v3(&expr);
    let second = render_v3(&expr);
    assert_eq!(first, second);
}

#[test]
fn same_tree_formats_concurrently() {
    let expr = it()
        .member("Category")
        .member("CategoryName")
        .eq("Beverages")
        .into_expr();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| render_v3(&expr)))
            .collect();
        for handle in handles {
            assert_eq!(
                handle.join().unwrap(),
                "Category/CategoryName eq 'Beverages'"
            );
        }
    });
}

#[test]
fn key_match_chooses_key_addressing() {
    let expr = it()
        .member("OrderID")
        .eq(1i64)
        .and(it().member("ProductID").eq(2i64))
        .into_expr();
    let mut keys = KeyMap::new();
    assert!(extract(&expr, &mut keys));

    let literals = DefaultLiteralFormatter::new(ODataVersion::V3);
    let cx = FormatContext::nameless(&Northwind, &literals, ODataVersion::V3);
    let rendered: Vec<String> = keys
        .iter()
        .map(|(name, value)| Ok(format!("{name}={}", format(value, &cx)?)))
        .collect::<Result<_, Error>>()
        .unwrap();
    assert_eq!(rendered.join(","), "OrderID=1,ProductID=2");
}

#[test]
fn failed_key_match_falls_back_to_filter() {
    let expr = it()
        .member("ProductID")
        .eq(1i64)
        .or(it().member("ProductID").eq(2i64))
        .into_expr();
    let mut keys = KeyMap::new();
    assert!(!extract(&expr, &mut keys));
    assert_eq!(render_v3(&expr), "ProductID eq 1 or ProductID eq 2");
}

#[test]
fn generation_only_changes_function_spelling() {
    let expr = it()
        .member("ProductName")
        .call("Contains", vec!["ai".into()])
        .and(it().member("UnitPrice").lt(20i64))
        .into_expr();
    assert_eq!(
        render(&expr, ODataVersion::V3).unwrap(),
        "substringof('ai',ProductName) and UnitPrice lt 20"
    );
    assert_eq!(
        render(&expr, ODataVersion::V4).unwrap(),
        "contains(ProductName,'ai') and UnitPrice lt 20"
    );
}

#[test]
fn mixed_unary_binary_precedence() {
    let expr = it()
        .member("Discontinued")
        .not()
        .and(it().member("UnitPrice").gt(0i64))
        .into_expr();
    assert_eq!(render_v3(&expr), "not Discontinued and UnitPrice gt 0");
}
