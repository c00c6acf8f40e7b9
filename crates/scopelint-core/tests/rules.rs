use scopelint_core::{
    parse_rule_config, scan_and_write, Analyzer, ExitScan, Issue, Language, RuleConfig, RuleId, ScanOptions,
};
use std::path::Path;

fn analyzer() -> Analyzer {
    Analyzer::new(&RuleConfig::default()).unwrap()
}

fn kinds(issues: &[Issue]) -> Vec<&str> {
    issues.iter().map(|i| i.kind.as_str()).collect()
}

#[test]
fn guard_without_exit_is_reported_at_the_else_block() {
    let src = "guard let x = maybe() else { log(x) }";
    let issues = analyzer().analyze(Language::Swift, src);
    assert_eq!(issues.len(), 1);
    let issue = &issues[0];
    assert_eq!(issue.rule, RuleId::GuardExit);
    assert_eq!((issue.line, issue.column), (1, 28));
    assert!(issue.message.contains("'x'"));
}

#[test]
fn guard_with_return_is_clean() {
    assert!(analyzer().analyze(Language::Swift, "guard let x = maybe() else { return }").is_empty());
}

#[test]
fn every_exit_keyword_suppresses_case_insensitively() {
    let a = analyzer();
    for kw in ["return", "THROW err", "break", "continue", "fatalError()", "preconditionfailure()"] {
        let src = format!("func f() {{\n  guard let v = g() else {{\n    {kw}\n  }}\n}}\n");
        assert!(a.analyze(Language::Swift, &src).is_empty(), "keyword {kw} should suppress");
    }
}

#[test]
fn swift_file_with_several_guards() {
    let src = r#"
func load(_ data: Data?) -> Model? {
    guard let raw = data else {
        print("no data")
    }
    guard let json = try? decode(raw) else {
        if verbose {
            print("bad json")
        }
        return nil
    }
    guard var model = Model(json) else {
        logger.warn("model")
    }
    return model
}
"#;
    let issues = analyzer().analyze(Language::Swift, src);
    let lines: Vec<usize> = issues.iter().map(|i| i.line).collect();
    assert_eq!(lines, vec![3, 12]);
    assert!(issues[1].message.starts_with("guard let 'model'"));
}

#[test]
fn swift_raw_strings_do_not_swallow_later_guards() {
    let a = analyzer();
    let trailing_backslash = "let dir = #\"C:\\tmp\\\"#\nfunc f() {\n    guard let x = maybe() else { log(x) }\n}\n";
    let issues = a.analyze(Language::Swift, trailing_backslash);
    assert_eq!(issues.len(), 1);
    assert_eq!((issues[0].line, issues[0].column), (3, 32));

    let odd_quotes = "let s = #\"a \" b\"#\nguard let y = maybe() else { log(y) }\n";
    let issues = a.analyze(Language::Swift, odd_quotes);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].line, 2);

    let block = "let t = #\"\"\"\n  \\\"\"\"\n\"\"\"#\nguard let z = maybe() else { log(z) }\n";
    assert_eq!(a.analyze(Language::Swift, block).len(), 1);
}

#[test]
fn strict_exit_mode_ignores_keywords_in_block_strings() {
    let src = "guard let x = maybe() else {\n  print(\"will return later\")\n}";
    assert!(analyzer().analyze(Language::Swift, src).is_empty());

    let strict = Analyzer::new(&RuleConfig::default().with_exit_scan(ExitScan::Code)).unwrap();
    assert_eq!(strict.analyze(Language::Swift, src).len(), 1);
}

#[test]
fn detects_statement_and_callable_leaks() {
    let src = r#"
import java.sql.*;
public class Leak {
    void bad(Connection conn) throws Exception {
        Statement stmt = conn.createStatement();
        PreparedStatement ps = conn.prepareStatement("select 1");
        CallableStatement call = conn.prepareCall("{ call bump(?) }");
        ResultSet rs = stmt.executeQuery("SELECT NOW()");
        System.out.println(rs.getMetaData());
    }
}
"#;
    let issues = analyzer().analyze(Language::Java, src);
    assert_eq!(
        kinds(&issues),
        vec!["statement_handle", "statement_handle", "statement_handle", "resultset_handle"]
    );
    let positions: Vec<(usize, usize)> = issues.iter().map(|i| (i.line, i.column)).collect();
    assert_eq!(positions, vec![(5, 9), (6, 9), (7, 9), (8, 9)]);
}

#[test]
fn try_with_resources_is_suppressed() {
    let src = r#"
import java.sql.*;
public class Clean {
    void tidy(Connection conn) throws Exception {
        try (Statement stmt = conn.createStatement();
             PreparedStatement ps = conn.prepareStatement("select 1");
             CallableStatement call = conn.prepareCall("{ call bump(?) }");
             ResultSet rs = stmt.executeQuery("SELECT NOW()")) {
            call.execute();
        }
    }
}
"#;
    assert!(analyzer().analyze(Language::Java, src).is_empty());
}

#[test]
fn commented_handles_are_ignored() {
    let src = r#"
class Commented {
    void noop(Connection conn) throws Exception {
        // PreparedStatement stmt = conn.prepareStatement("select 1");
        /* ResultSet rs = stmt.executeQuery(); */
    }
}
"#;
    assert!(analyzer().analyze(Language::Java, src).is_empty());
}

#[test]
fn string_literals_with_slashes_are_not_comments() {
    let src = r#"
class Strings {
    void noop(Connection conn) throws Exception {
        String text = "Statement stmt = conn.createStatement();";
        String url = "jdbc://host/db"; ResultSet rs = conn.createStatement().executeQuery(url);
    }
}
"#;
    let issues = analyzer().analyze(Language::Java, src);
    assert_eq!(kinds(&issues), vec!["resultset_handle"]);
    assert_eq!(issues[0].line, 5);
}

#[test]
fn text_blocks_are_ignored() {
    let src = "class TextBlock {\n    void noop(Connection conn) {\n        String sql = \"\"\"\n            Statement stmt = conn.createStatement();\n        \"\"\";\n        System.out.println(sql);\n    }\n}\n";
    assert!(analyzer().analyze(Language::Java, src).is_empty());
}

#[test]
fn custom_handle_types_from_config() {
    let cfg = parse_rule_config(
        "[resource.handle_types]\nFileInputStream = \"stream_handle\"\nResultSet = \"resultset_handle\"\n",
        Path::new("custom.toml"),
    )
    .unwrap();
    let a = Analyzer::new(&cfg).unwrap();
    let src = "FileInputStream in = new FileInputStream(p);\nStatement s = c.createStatement();\n";
    assert_eq!(kinds(&a.analyze(Language::Java, src)), vec!["stream_handle"]);
}

#[test]
fn rules_route_by_language() {
    let a = analyzer();
    assert!(a.analyze(Language::Java, "guard let x = y else { log() }").is_empty());
    assert!(a.analyze(Language::Swift, "Statement s = c.createStatement();").is_empty());
}

#[test]
fn unterminated_constructs_do_not_panic() {
    let a = analyzer();
    assert_eq!(a.analyze(Language::Swift, "guard let x = y else { log(").len(), 1);
    assert!(a.analyze(Language::Swift, "guard let x = y else { \"return").is_empty());
    assert_eq!(a.analyze(Language::Java, "try (Statement s = c.x(").len(), 0);
    assert!(a.analyze(Language::Java, "String s = \"Statement t = x;").is_empty());
}

#[test]
fn fixture_directory_scan() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(
        root.join("ResourceLifecycle.java"),
        "public class ResourceLifecycle {\n    public void leakJdbc(Connection conn) throws SQLException {\n        Statement stmt = conn.createStatement();\n        PreparedStatement ps = conn.prepareStatement(\"SELECT * FROM users WHERE id = ?\");\n        ps.setInt(1, 42);\n        ResultSet rs = stmt.executeQuery(\"SELECT NOW()\");\n    }\n}\n",
    )
    .unwrap();
    std::fs::write(root.join("Unreadable.java"), b"\0\0\0binary").unwrap();

    let mut out = Vec::new();
    let stats = scan_and_write(root, &mut out, &ScanOptions::default()).unwrap();
    let text = String::from_utf8(out).unwrap();
    let second_fields: Vec<&str> = text.lines().filter_map(|l| l.split('\t').nth(1)).collect();

    assert_eq!(second_fields, vec!["statement_handle", "statement_handle", "resultset_handle"]);
    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.files_skipped, 1);
}
