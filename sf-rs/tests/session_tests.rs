//! End-to-end scenarios: scripts loaded into sessions, run against the
//! standard catalog, observed through results, variables and captured output.

use std::sync::Arc;

use sfscript::cli::{collect_script_paths, script_name};
use sfscript::error::{ErrorKind, SessionError};
use sfscript::host::{Host, Output};
use sfscript::ops::standard_tree;
use sfscript::script::Value;
use sfscript::session::{Session, SessionManager};
use sfscript::types::TypeRegistry;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn manager() -> SessionManager {
    SessionManager::with_standard_catalog(Host::capturing()).unwrap()
}

fn all_ok(results: &[sfscript::script::ExecutionResult]) {
    let failed: Vec<String> = results.iter().filter(|r| !r.success()).map(|r| r.to_string()).collect();
    assert!(failed.is_empty(), "failed commands:\n  {}", failed.join("\n  "));
}

// ── Type system through scripts ───────────────────────────────────────────────

const ENEMY_MOD: &str = "\
// Enemy definitions
// @field:int startHealth = 120
SFScript.Interface.Define('Movable')
SFScript.Interface.Define('Colorable')
SFScript.Interface.Define('ColorMovable', 'Movable', 'Colorable')
SFScript.Type.Define('Enemy', 'Component', 'ColorMovable')
SFScript.Type.DefineProperty('Enemy', 'health', $startHealth)
SFScript.Type.Define('Boss', 'Enemy')
$boss = SFScript.Type.Create('Boss')
$enemy = SFScript.Type.Create('Enemy')
$isMovable = SFScript.Type.Is($boss, 'Movable')
$isColorable = SFScript.Type.Is($enemy, 'Colorable')
$hp = SFScript.Type.GetProperty($enemy, 'health')
$bossHp = SFScript.Type.GetProperty($boss, 'health')
";

#[test]
fn diamond_interfaces_and_uninherited_defaults() {
    let mut m = manager();
    let s = m.load_text("enemies", ENEMY_MOD).unwrap();
    all_ok(&s.execute_all().unwrap());

    assert_eq!(s.get_variable("isMovable"), Some(Value::Bool(true)));
    assert_eq!(s.get_variable("isColorable"), Some(Value::Bool(true)));
    assert_eq!(s.get_variable("hp"), Some(Value::Int(120)));
    // defaults belong to the declaring type only
    assert_eq!(s.get_variable("bossHp"), Some(Value::Null));
}

#[test]
fn sessions_share_one_registry() {
    let mut m = manager();
    m.load_text("defs", "SFScript.Type.Define('Pickup', 'Component')").unwrap();
    m.get("defs").unwrap().execute_all().unwrap();

    let s = m.load_text("use", "$p = SFScript.Type.Create('Pickup')").unwrap();
    all_ok(&s.execute_all().unwrap());
    assert!(m.host().registry.read().has_type("Pickup"));
}

#[test]
fn registration_failure_leaves_no_state() {
    let mut m = manager();
    let s = m
        .load_text("bad", "SFScript.Type.Define('Orphan', 'Missing')\nSFScript.Type.IsSubclassOf('Orphan', 'Orphan')")
        .unwrap();
    let results = s.execute_all().unwrap();
    assert_eq!(results[0].error_kind(), Some(ErrorKind::TypeRegistration));
    assert!(!m.host().registry.read().has_type("Orphan"));
}

// ── Output and math ───────────────────────────────────────────────────────────

#[test]
fn console_and_vectors() {
    let host = Host::new(TypeRegistry::shared(), Output::buffer());
    let tree = Arc::new(standard_tree().unwrap());
    let script = "\
// @field:float speed = 2
$dir = Engine.Vector3.Normalized(Vector3(0, 3, 4))
$len = Engine.Vector3.Magnitude(Vector3(0, 3, 4))
$step = Engine.Mathf.Lerp(0, $speed, 0.5)
System.Console.WriteLine($dir)
System.Console.WriteLine($step)
";
    let s = Session::new("move", vec![("move".into(), script.into())], tree, host.clone()).unwrap();
    all_ok(&s.execute_all().unwrap());
    assert_eq!(s.get_variable("len"), Some(Value::Float(5.0)));
    assert_eq!(host.output.contents(), "Vector3(0.0, 0.6, 0.8)\n1.0\n");
}

#[test]
fn mixed_good_and_bad_lines() {
    let mut m = manager();
    let s = m
        .load_text("mixed", "Engine.Mathf.PI()\nEngine.Mathf.Nope()\nEngine.Mathf(1)\nbroken line\nEngine.Mathf.PI()")
        .unwrap();
    let kinds: Vec<Option<ErrorKind>> = s.execute_all().unwrap().iter().map(|r| r.error_kind()).collect();
    assert_eq!(
        kinds,
        [
            None,
            Some(ErrorKind::NamespaceNotFound),
            Some(ErrorKind::MethodNotFound),
            Some(ErrorKind::Syntax),
            None,
        ]
    );
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[test]
fn unload_then_reload() {
    let mut m = manager();
    m.load_text("s", "// @field:string name = 'first'\nEngine.Mathf.PI()").unwrap();
    m.unload("s").unwrap();
    assert!(!m.is_loaded("s"));
    let s = m.load_text("s", "// @field:string name = 'second'\nEngine.Mathf.PI()").unwrap();
    assert_eq!(s.get_variable("name"), Some(Value::Str("second".into())));
    assert_eq!(m.unload("s"), Ok(()));
    assert_eq!(m.unload("s"), Err(SessionError::SessionNotFound("s".into())));
}

// ── Loading from disk ─────────────────────────────────────────────────────────

#[test]
fn load_directory_bundle() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("01_define.sfs"), "SFScript.Type.Define('Crate', 'Component')").unwrap();
    std::fs::write(tmp.path().join("02_use.sfs"), "$c = SFScript.Type.Create('Crate')").unwrap();
    std::fs::write(tmp.path().join("readme.md"), "not a script").unwrap();

    let paths = collect_script_paths(&[tmp.path().to_path_buf()]).unwrap();
    let bundle: Vec<(String, String)> = paths
        .iter()
        .map(|p| (script_name(p), std::fs::read_to_string(p).unwrap()))
        .collect();

    let mut m = manager();
    let s = m.load("disk", bundle).unwrap();
    assert_eq!(s.script_names(), ["01_define", "02_use"]);
    all_ok(&s.execute_all().unwrap());
    assert!(s.get_variable("c").is_some_and(|v| v.as_component().is_some()));
}
