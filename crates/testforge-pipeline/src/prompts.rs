//! Prompt templates.

const GENERATE_INSTRUCTION: &str = "Generate only unit test code that achieves 100% coverage of the \
following Python code. Do not include comments or explanations.";

const REPAIR_INSTRUCTION: &str = "The following test code is failing. Identify the cause and fix \
both the original code and the test code.";

fn fenced(instruction: &str, code: &str) -> String {
    format!("{instruction}\n\n```python\n{code}\n```")
}

/// Prompt asking for tests of `source`.
pub fn generation_prompt(source: &str) -> String {
    fenced(GENERATE_INSTRUCTION, source)
}

/// Prompt asking for a corrected version of the failing `test_code`.
pub fn repair_prompt(test_code: &str) -> String {
    fenced(REPAIR_INSTRUCTION, test_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_prompt_fences_source() {
        let prompt = generation_prompt("def f():\n    return 1");
        assert!(prompt.starts_with(GENERATE_INSTRUCTION));
        assert!(prompt.contains("100% coverage"));
        assert!(prompt.ends_with("```python\ndef f():\n    return 1\n```"));
    }

    #[test]
    fn test_repair_prompt_fences_test_code() {
        let prompt = repair_prompt("assert False");
        assert!(prompt.contains("failing"));
        assert!(prompt.ends_with("```python\nassert False\n```"));
    }
}
