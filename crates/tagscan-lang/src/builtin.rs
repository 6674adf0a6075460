use crate::CommentRule;

/// Built-in comment delimiters for well-known language ids.
///
/// Used when a language has no readable language-configuration file. Returns `None` for
/// unknown ids.
pub fn builtin_comment_rule(language_id: &str) -> Option<CommentRule> {
    let rule = match language_id {
        "asciidoc" => CommentRule::line_and_block("//", "////", "////"),
        "apex" | "javascript" | "javascriptreact" | "typescript" | "typescriptreact" | "al"
        | "c" | "cpp" | "csharp" | "dart" | "flax" | "fsharp" | "go" | "groovy" | "haxe"
        | "java" | "jsonc" | "kotlin" | "less" | "pascal" | "objectpascal" | "php" | "rust"
        | "scala" | "sass" | "scss" | "stylus" | "swift" | "verilog" => {
            CommentRule::line_and_block("//", "/*", "*/")
        }
        "css" => CommentRule::block("/*", "*/"),
        "coffeescript" | "dockerfile" | "gdscript" | "graphql" | "julia" | "makefile"
        | "perl" | "perl6" | "puppet" | "r" | "ruby" | "shellscript" | "tcl" | "yaml" => {
            CommentRule::line("#")
        }
        "elixir" | "python" => CommentRule::line_and_block("#", "\"\"\"", "\"\"\""),
        "nim" => CommentRule::line_and_block("#", "#[", "]#"),
        "powershell" => CommentRule::line_and_block("#", "<#", "#>"),
        "ada" | "hive-sql" | "pig" | "plsql" | "sql" => CommentRule::line("--"),
        "lua" => CommentRule::line_and_block("--", "--[[", "]]"),
        "elm" | "haskell" => CommentRule::line_and_block("--", "{-", "-}"),
        // PlantUML is registered as `diagram`.
        "vb" | "asp" | "diagram" => CommentRule::line("'"),
        "bibtex" | "erlang" | "latex" | "matlab" => CommentRule::line("%"),
        "clojure" | "elps" | "racket" | "lisp" => CommentRule::line(";"),
        "terraform" => CommentRule::line_and_block("#", "/*", "*/"),
        "COBOL" => CommentRule::line("*>"),
        "fortran-modern" => CommentRule::line("c"),
        "SAS" | "stata" => CommentRule::line_and_block("*", "/*", "*/"),
        "html" | "xml" | "markdown" | "vue" => CommentRule::block("<!--", "-->"),
        "twig" => CommentRule::block("{#", "#}"),
        "genstat" => CommentRule::line_and_block("\\", "\"", "\""),
        "cfml" => CommentRule::block("<!---", "--->"),
        "shaderlab" => CommentRule::line("//"),
        "razor" => CommentRule::block("@*", "*@"),
        _ => return None,
    };
    Some(rule)
}
