use chrono::NaiveDateTime;

/// Feedback collection template for one skill.
///
/// Entry and marker examples live inside fenced blocks so that analyzing an
/// unfilled template counts nothing.
pub fn render_feedback_template(skill: &str, version: &str, generated_at: NaiveDateTime) -> String {
    let collected = generated_at.format("%Y-%m-%d %H:%M:%S");
    format!(
        r#"# {skill} Feedback

**Collected:** {collected}
**Skill version:** {version}
**Status:** Collecting

---

## Feedback Guide

Copy one of the skeletons below into the records section for every item.

### Reporting a problem

```markdown
## Problem
[Describe the problem in detail]

**Type:** 🔴 Bug | 🟡 Missing feature | 🟢 UX
**Severity:** 🔴 Critical | 🟡 Major | 🟢 Minor

### Steps to reproduce
1. Run the command
2. Observe the output
3. Expected output

### Environment
- Tool version:
- Operating system:
- Skill version:
```

### Suggesting an improvement

```markdown
## Suggestion
[Describe the improvement]

**Type:** ✨ New feature | 🚀 Performance | 📝 Docs

### Use case
[When would this help?]

### Expected benefit
- Efficiency:
- User experience:
- Coverage:

### Effort
- [ ] Small (< 1 day)
- [ ] Medium (1-3 days)
- [ ] Large (> 3 days)
```

---

## Feedback Records

### Problems

<!-- Paste problem reports here. -->

### Suggestions

<!-- Paste suggestions here. -->

---

## Statistics

| Type | Count | Resolved | Open |
|------|-------|----------|------|
| Critical problems | 0 | 0 | 0 |
| Major problems | 0 | 0 | 0 |
| Minor problems | 0 | 0 | 0 |
| New features | 0 | 0 | 0 |
| Performance | 0 | 0 | 0 |
| Docs | 0 | 0 | 0 |

---

## Links

- [Skill documentation](../{skill}/SKILL.md)
"#
    )
}
