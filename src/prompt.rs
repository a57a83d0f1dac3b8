/// Commit types the model may choose from.
pub const COMMIT_TYPES: [&str; 10] = [
    "feat", "fix", "refactor", "perf", "test", "docs", "build", "ops", "chore", "style",
];

const CONVENTIONAL_COMMIT_FORMAT: &str = "
<type>: <description>

Possible <types> and commits they describe:

- feat: Commits that add or remove a new feature to the API or UI
- fix: Commits that fix a API or UI bug of a preceded feat commit
- refactor: Commits that rewrite/restructure your code, however do not change any API or UI behaviour
- perf: Special refactor commits, that improve performance
- style: Commits that do not affect the meaning (white-space, formatting, missing semi-colons, etc)
- test: Commits that add missing tests or correcting existing tests
- docs: Commits that affect documentation only
- build: Commits that affect build components like build tool, ci pipeline, dependencies, project version, ...
- ops: Commits that affect operational components like infrastructure, deployment, backup, recovery, ...
- chore: Miscellaneous commits e.g. modifying .gitignore
";

const SYSTEM_PERSONA: &str = "\
You are an expert software engineer who writes git commit messages. \
You read the output of `git diff --cached` and describe the staged changes \
following the Conventional Commits format `<type>: <description>`.";

/// Build the user prompt sent alongside the (already truncated) diff.
pub fn build_prompt(diff: &str, message_max_length: usize, commit_type_hint: Option<&str>) -> String {
    let mut parts = Vec::new();

    parts.push(format!(
        "Summarize the changes made in the staged files from the output of the `git diff --cached` command placed between the XML tags <diff>, following these guidelines:
    - You must keep the response under {message_max_length} words.
    - You must focus on why the changes were made.
    - Place the summary inside <summary> XML tags.
    - Follow the conventional commit format defined between the XML tags <format>."
    ));

    parts.push(format!("<format>{CONVENTIONAL_COMMIT_FORMAT}</format>"));

    if let Some(hint) = commit_type_hint {
        parts.push(format!("Make sure to choose {hint} as <type>."));
    }

    parts.push(format!("<diff>{diff}</diff>"));

    parts.join("\n\n") + "\n"
}

/// Build the fixed system instruction describing persona and output format.
pub fn build_system_prompt() -> String {
    let mut parts = Vec::new();

    parts.push(SYSTEM_PERSONA.to_string());

    parts.push(format!(
        "The <type> must be one of: {}.",
        COMMIT_TYPES.join(", ")
    ));

    parts.push(
        "If the user does not ask for a specific <type>, infer the most fitting one from the diff."
            .to_string(),
    );

    parts.push(
        "Use present tense. Be concise. Always place the final commit message inside <summary></summary> tags."
            .to_string(),
    );

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_appear_in_fixed_order() {
        let prompt = build_prompt("+fn main() {}", 42, Some("feat"));

        let summarize = prompt.find("Summarize the changes").expect("summarize");
        let ceiling = prompt.find("under 42 words").expect("ceiling");
        let why = prompt.find("why the changes were made").expect("why");
        let tags = prompt.find("inside <summary> XML tags").expect("tags");
        let hint = prompt.find("choose feat as <type>").expect("hint");
        let diff = prompt.find("<diff>+fn main() {}</diff>").expect("diff");

        assert!(summarize < ceiling);
        assert!(ceiling < why);
        assert!(why < tags);
        assert!(tags < hint);
        assert!(hint < diff);
    }

    #[test]
    fn hint_clause_is_omitted_without_hint() {
        let prompt = build_prompt("diff", 10, None);
        assert!(!prompt.contains("Make sure to choose"));
        assert!(!prompt.contains("\n\n\n\n"));
    }

    #[test]
    fn diff_is_embedded_verbatim() {
        let diff = "-  old \"quoted\" `tick`\n+  new\n";
        let prompt = build_prompt(diff, 10, None);
        assert!(prompt.contains(&format!("<diff>{diff}</diff>")));
    }

    #[test]
    fn system_prompt_lists_every_commit_type() {
        let system = build_system_prompt();
        for kind in COMMIT_TYPES {
            assert!(system.contains(kind), "missing {kind}");
        }
        assert!(system.contains("infer the most fitting one"));
    }

    #[test]
    fn builders_are_deterministic() {
        assert_eq!(build_system_prompt(), build_system_prompt());
        assert_eq!(
            build_prompt("d", 3, Some("fix")),
            build_prompt("d", 3, Some("fix"))
        );
    }
}
