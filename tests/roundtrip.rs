use moltke::{parse_string, parse_text, to_string, to_vec, Date, Rgb, Value};
use std::rc::Rc;

fn reparse(tree: &Value) -> Value {
    let out = to_vec(tree).unwrap();
    parse_text(out.as_slice()).unwrap()
}

#[test]
fn constructed_tree_round_trips() {
    let tree = Value::Record(vec![
        (Rc::from("foo"), Value::Number(1.5)),
        (Rc::from("b"), Value::Bool(true)),
    ]);

    assert_eq!(reparse(&tree), tree);
}

#[test]
fn parsed_tree_round_trips() {
    let data = r#"
        date=1444.11.11
        player="CAS"
        manpower=12.500
        at_war=no
        army={
            name="1st Army"
            regiment={morale=3.000 strength=1.000}
            regiment={morale=2.500 strength=0.500}
        }
        ledger={1.000 2.000 3.000}
        color=rgb { 110 27 27 }
        shade=hsv { 0.500 0.200 0.800 }
    "#;

    let tree = parse_string(data).unwrap();
    assert_eq!(reparse(&tree), tree);
}

#[test]
fn duplicate_keys_round_trip_in_order() {
    let tree = parse_string("army={a=1} army={a=2} army={a=3}").unwrap();
    let again = reparse(&tree);
    assert_eq!(again, tree);

    let keys: Vec<_> = again.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec!["army", "army", "army"]);
}

#[test]
fn dates_round_trip() {
    let tree = Value::Record(vec![
        (Rc::from("start"), Value::Date(Date::new(1444, 11, 11, 0).unwrap())),
        (Rc::from("zero_hour"), Value::Date(Date::new(1936, 1, 1, 12).unwrap())),
    ]);

    assert_eq!(reparse(&tree), tree);
}

#[test]
fn colors_round_trip() {
    let tree = Value::Record(vec![
        (Rc::from("a"), Value::Hsv([0.5, 0.2, 0.8])),
        (Rc::from("b"), Value::Rgb(Rgb { r: 0, g: 255, b: 27 })),
    ]);

    assert_eq!(reparse(&tree), tree);
}

#[test]
fn non_ascii_strings_round_trip() {
    let tree = Value::Record(vec![(
        Rc::from("ruler"),
        Value::String(Rc::from("Jürgen von Œrsted")),
    )]);

    assert_eq!(reparse(&tree), tree);
}

#[test]
fn nested_containers_round_trip() {
    let tree = parse_string("a={ {1 2} {3 4} } b={ {x=1} {y=2} } c={}").unwrap();
    assert_eq!(reparse(&tree), tree);
}

#[test]
fn serialized_form_is_stable() {
    let tree = parse_string("foo=bar num=3.142 ok=yes").unwrap();
    assert_eq!(
        to_string(&tree).unwrap(),
        "foo=\"bar\"\nnum=3.142\nok=yes\n"
    );
}
