//! Integration tests for the record transformation engine.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use mailforge::{
    to_record, FieldFn, MailDb, Record, Rule, RuleSet, TransformOptions,
};

fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[tokio::test]
async fn pure_remap_is_source_lookup_with_literal_fallback() {
    let db = MailDb::open(".");
    let source = to_record(&json!({ "mail": "bob@example.com", "name": "Bob" }));
    let rules = RuleSet::from_value(json!({
        "email": "mail",
        "who": "name",
        "date": "27.06.2025"
    }))
    .unwrap();

    let output = db
        .transform(&source, &rules, &TransformOptions::new())
        .await
        .unwrap();

    assert_eq!(output["email"], json!("bob@example.com"));
    assert_eq!(output["who"], json!("Bob"));
    // No "27.06.2025" field exists, so the rule value is the result.
    assert_eq!(output["date"], json!("27.06.2025"));
}

#[tokio::test]
async fn dotted_refs_walk_nested_records_and_sequences() {
    let db = MailDb::open(".");
    let source = to_record(&json!({
        "a": { "b": { "c": 5 } },
        "items": ["x", "y"]
    }));
    let rules = RuleSet::from_value(json!({
        "deep": { "$ref": "a.b.c" },
        "second": { "$ref": "items.1" },
        "missing": { "$ref": "a.b.x" },
        "out_of_range": { "$ref": "items.5" }
    }))
    .unwrap();

    let reported = Mutex::new(Vec::new());
    let opts = TransformOptions::new()
        .on_error(|reason, _| reported.lock().unwrap().push(reason.to_string()));

    let output = db.transform(&source, &rules, &opts).await.unwrap();

    assert_eq!(output["deep"], json!(5));
    assert_eq!(output["second"], json!("y"));
    assert_eq!(output["missing"], Value::Null);
    assert_eq!(output["out_of_range"], Value::Null);
    assert_eq!(reported.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn function_rule_arity_dispatch() {
    let db = MailDb::open(".");
    let source = to_record(&json!({ "name": "Bob Example" }));

    let mut rules = RuleSet::new();
    // One-argument convention: only the source record.
    rules.insert(
        "first",
        Rule::call(
            FieldFn::simple(|source, _| {
                let name = source.get("name").and_then(|v| v.as_str()).unwrap_or("");
                json!(name.split(' ').next().unwrap_or(""))
            }),
            vec![],
        ),
    );
    // Full convention: output so far, field name, source, extra args.
    rules.insert(
        "labeled",
        Rule::call(
            FieldFn::full(|output, field, _source, args| {
                let first = output.get("first").and_then(|v| v.as_str()).unwrap_or("");
                json!(format!("{}:{}:{}", field, first, args[0].as_str().unwrap()))
            }),
            vec![json!("x")],
        ),
    );

    let output = db
        .transform(&source, &rules, &TransformOptions::new())
        .await
        .unwrap();

    assert_eq!(output["first"], json!("Bob"));
    assert_eq!(output["labeled"], json!("labeled:Bob:x"));
}

#[tokio::test]
async fn keep_seeds_source_before_rules() {
    let db = MailDb::open(".");
    let source = to_record(&json!({ "a": 1, "b": 2 }));
    let mut rules = RuleSet::new();
    rules.set_keep(true);
    rules.insert("c", Rule::call(FieldFn::simple(|_, _| json!(3)), vec![]));

    let output = db
        .transform(&source, &rules, &TransformOptions::new())
        .await
        .unwrap();

    assert_eq!(
        Value::Object(output),
        json!({ "a": 1, "b": 2, "c": 3 })
    );
}

#[tokio::test]
async fn lookup_table_selects_by_input_field() {
    let db = MailDb::open(".");
    let source = to_record(&json!({ "g": 1 }));
    let rules = RuleSet::from_value(json!({
        "gender": { "0": "f", "1": "m", "$input": "g" }
    }))
    .unwrap();

    let output = db
        .transform(&source, &rules, &TransformOptions::new())
        .await
        .unwrap();

    assert_eq!(output["gender"], json!("m"));
}

#[tokio::test]
async fn end_to_end_field_derivation() {
    let db = MailDb::open(".");
    let source = to_record(&json!({
        "name": "Bob Example",
        "gender": 1,
        "mail": "bob@example.com"
    }));

    let mut rules = RuleSet::new();
    rules.insert(
        "formattedName",
        Rule::call(
            FieldFn::simple(|source, _| {
                let name = source.get("name").and_then(|v| v.as_str()).unwrap_or("");
                json!(name.split(' ').next().unwrap_or(""))
            }),
            vec![],
        ),
    );
    rules.insert(
        "genderText",
        Rule::call(
            FieldFn::simple(|source, _| {
                json!(if source.get("gender") == Some(&json!(1)) {
                    "male"
                } else {
                    "female"
                })
            }),
            vec![],
        ),
    );
    rules.insert("email", Rule::reference("mail"));
    rules.insert(
        "certificateNo",
        Rule::call(FieldFn::simple(|_, _| json!("001")), vec![]),
    );

    let output = db
        .transform(&source, &rules, &TransformOptions::new())
        .await
        .unwrap();

    assert_eq!(
        Value::Object(output),
        json!({
            "formattedName": "Bob",
            "genderText": "male",
            "email": "bob@example.com",
            "certificateNo": "001"
        })
    );
}

#[tokio::test]
async fn certificate_batch_with_module_references() {
    // Rule-set declared as plain data in a YAML config; functions are
    // bound by file stem through the registry.
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "certs/fields.yaml",
        concat!(
            "no: ../functions/leading-zeros.js:3\n",
            "date: 27.06.2025\n",
            "name: ../functions/first-name.js\n",
            "part:\n",
            "  \"0\": took part\n",
            "  \"1\": took part (m)\n",
            "  $input: gender\n",
            "email:\n",
            "  $ref: mail\n",
        ),
    );
    write_file(
        dir.path(),
        "recipients.json",
        r#"[
            { "name": "Iryna Antypenko", "gender": 0, "mail": "iryna@example.com" },
            { "name": "Hryhorii Skovoroda", "gender": 1, "mail": "skovoroda@example.com" }
        ]"#,
    );

    let mut db = MailDb::open(dir.path());
    let counter = Arc::new(AtomicUsize::new(1));
    let counter_fn = Arc::clone(&counter);
    db.register(
        "leading-zeros",
        FieldFn::full(move |_output, _field, _source, args| {
            let len: usize = args
                .first()
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            let n = counter_fn.fetch_add(1, Ordering::SeqCst);
            json!(format!("{:0width$}", n, width = len))
        }),
    );
    db.register(
        "first-name",
        FieldFn::simple(|source, _| {
            let name = source.get("name").and_then(|v| v.as_str()).unwrap_or("");
            json!(name.split(' ').next().unwrap_or(""))
        }),
    );

    let rules = RuleSet::load_from_file(dir.path().join("certs/fields.yaml")).unwrap();
    let recipients = db.get("recipients.json").await.unwrap();
    let recipients = recipients.as_array().unwrap();
    let opts = TransformOptions::new().with_dir(dir.path().join("certs"));

    let first = db
        .transform(&to_record(&recipients[0]), &rules, &opts)
        .await
        .unwrap();
    assert_eq!(first["no"], json!("001"));
    assert_eq!(first["date"], json!("27.06.2025"));
    assert_eq!(first["name"], json!("Iryna"));
    assert_eq!(first["part"], json!("took part"));
    assert_eq!(first["email"], json!("iryna@example.com"));

    let second = db
        .transform(&to_record(&recipients[1]), &rules, &opts)
        .await
        .unwrap();
    assert_eq!(second["no"], json!("002"));
    assert_eq!(second["name"], json!("Hryhorii"));
    assert_eq!(second["part"], json!("took part (m)"));
    assert_eq!(second["email"], json!("skovoroda@example.com"));
}

#[tokio::test]
async fn ref_loads_external_documents_and_format_handlers() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "body.json", r#"{ "greeting": "hello" }"#);
    write_file(dir.path(), "banner.img", "binary-ish");

    let db = MailDb::open(dir.path());
    let rules = RuleSet::from_value(json!({
        "body": { "$ref": "./body.json" },
        "banner": { "$ref": "./banner.img" }
    }))
    .unwrap();
    let opts = TransformOptions::new()
        .with_dir(dir.path())
        .with_format(
            "img",
            Arc::new(|path: &std::path::Path| {
                Ok(json!(format!("loaded:{}", path.file_name().unwrap().to_string_lossy())))
            }),
        );

    let output = db.transform(&Record::new(), &rules, &opts).await.unwrap();

    assert_eq!(output["body"], json!({ "greeting": "hello" }));
    assert_eq!(output["banner"], json!("loaded:banner.img"));
}

#[tokio::test]
async fn missing_external_document_aborts_transform() {
    let dir = tempfile::tempdir().unwrap();
    let db = MailDb::open(dir.path());
    let rules = RuleSet::from_value(json!({ "body": { "$ref": "./missing.json" } })).unwrap();
    let opts = TransformOptions::new().with_dir(dir.path());

    let err = db
        .transform(&Record::new(), &rules, &opts)
        .await
        .unwrap_err();
    assert!(matches!(err, mailforge::MailError::Io { .. }));
}

#[tokio::test]
async fn transform_is_idempotent_over_shared_rules() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = MailDb::open(dir.path());
    db.register("upper", FieldFn::simple(|source, _| {
        let name = source.get("name").and_then(|v| v.as_str()).unwrap_or("");
        json!(name.to_uppercase())
    }));

    let source = to_record(&json!({ "name": "bob" }));
    let rules = RuleSet::from_value(json!({
        "loud": "./upper.js",
        "email": { "$ref": "mail" },
        "copy": "name"
    }))
    .unwrap();
    let opts = TransformOptions::new().with_dir(dir.path());

    let first = db.transform(&source, &rules, &opts).await.unwrap();
    let second = db.transform(&source, &rules, &opts).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first["loud"], json!("BOB"));
    assert_eq!(first["copy"], json!("bob"));
}

#[tokio::test]
async fn every_rule_field_appears_in_output() {
    let db = MailDb::open(".");
    let source = to_record(&json!({ "a": 1 }));
    let rules = RuleSet::from_value(json!({
        "good": "a",
        "bad_ref": { "$ref": "nope.deep" },
        "silent": { "0": "x", "$input": "nope" }
    }))
    .unwrap();

    let output = db
        .transform(&source, &rules, &TransformOptions::new())
        .await
        .unwrap();

    assert_eq!(output.len(), 3);
    assert!(output.contains_key("good"));
    assert!(output.contains_key("bad_ref"));
    assert!(output.contains_key("silent"));
}
