use std::{io::BufRead, path::{Path, PathBuf}};

use anyhow::bail;
use itertools::Itertools;
use serde::{de::{Visitor, Error}, Deserialize};


#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TestOutput {
    Number(f64),
    Complex { real: f64, imag: f64 },
    List(Vec<TestOutput>),
    /// Compared against the `Display` rendering of the result
    Rendered(String),
}

#[derive(Debug, Clone)]
pub enum TestOutcome {
    Value(TestOutput),
    SyntaxError,
    SemanticError,
}

#[derive(Debug, Clone)]
pub struct TestEvaluationResult(TestOutcome);

impl From<TestEvaluationResult> for TestOutcome {
    fn from(value: TestEvaluationResult) -> Self {
        value.0
    }
}

struct TestEvaluationResultVisitor {}

impl<'de> Deserialize<'de> for TestEvaluationResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de> {

        deserializer.deserialize_map(TestEvaluationResultVisitor {})
    }
}

impl<'de> Visitor<'de> for TestEvaluationResultVisitor {
    type Value = TestEvaluationResult;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "A structure containing the boolean key 'ok'. If it's okay, contains the key 'output', otherwise the key 'type'")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>, {

        if map.next_key::<String>()? != Some("ok".to_owned()) {
            return Err(A::Error::custom("First key should be 'ok'"))
        }

        let ok: bool = map.next_value()?;
        let expected_key = if ok { "output" } else { "type" };
        if map.next_key::<String>()?.as_deref().ok_or(A::Error::custom("Must have two keys"))? != expected_key {
            return Err(A::Error::custom(format!("Second key should be '{}'", expected_key)))
        }

        let outcome = if ok {
            TestOutcome::Value(map.next_value()?)
        } else {
            match map.next_value::<String>()?.as_ref() {
                "SyntaxError" => TestOutcome::SyntaxError,
                "SemanticError" => TestOutcome::SemanticError,
                other => return Err(A::Error::custom(format!("Unrecognized error type: {}", other)))
            }
        };

        if map.next_key::<String>()?.is_some() {
            return Err(A::Error::custom("Only two keys should be present"));
        }

        Ok(TestEvaluationResult(outcome))
    }
}

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn load_input_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let source = std::fs::read(path)?;
    Ok(source.lines().collect::<Result<Vec<String>, _>>()?)
}

fn load_output_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<TestEvaluationResult>> {
    let source = std::fs::read(path)?;
    let result: Vec<TestEvaluationResult> = serde_json::from_slice(&source)?;
    Ok(result)
}

/// Each line of `test_inputs/<testcase>.pls` is one program, paired with the
/// entry at the same index in `test_outputs/<testcase>.json`
pub fn load_test_pair(testcase: &str) -> anyhow::Result<Vec<(String, TestEvaluationResult)>> {
    let base_path = fixture_root();
    let input = load_input_file(base_path.join("test_inputs").join(format!("{}.pls", testcase)))?;
    let output = load_output_file(base_path.join("test_outputs").join(format!("{}.json", testcase)))?;

    if input.len() != output.len() { bail!("Input and output of testcase {} does not match", testcase); }
    Ok(input.into_iter().zip(output).collect_vec())
}

pub fn all_testcases() -> anyhow::Result<Vec<String>> {
    let mut testcases = vec![];
    for entry in std::fs::read_dir(fixture_root().join("test_inputs"))? {
        let path = entry?.path();
        if path.extension().and_then(|extension| extension.to_str()) != Some("pls") { continue; }

        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            testcases.push(stem.to_owned());
        }
    }

    if testcases.is_empty() { bail!("No testcases found"); }
    testcases.sort();
    Ok(testcases)
}
