const PATH_SEPARATOR: &str = " > ";
const BULLET: char = '*';

/// Instruction asking for a three-way MECE split of the last path element.
pub fn build_prompt(path: &[String]) -> String {
	let chain = path.join(PATH_SEPARATOR);
	let target = path.last().map(String::as_str).unwrap_or_default();
	format!(
		"## Your role
You decompose a given role into a tree of sub-roles.
The goal is to split each role into parts that are mutually exclusive and collectively exhaustive (MECE), simple enough that whoever takes one on can start concrete work.

## Work so far
The decomposition so far is shown below. Only the direct chain from the root down to the role to split next is given; sibling roles are left out.
{chain}

## Instructions
Building on the work so far, split the given role into sub-roles that are as MECE and as concrete as possible.
There must be exactly three sub-roles.
Write them as a bullet list, one per line, each line starting with `{BULLET} `, and write nothing else.

## Example output
{BULLET} Sub-role 1
{BULLET} Sub-role 2
{BULLET} Sub-role 3

## Start
Split \"{target}\" into the following three roles.
"
	)
}

/// Splits a completion on the bullet marker. Text before the first bullet is
/// dropped; every other segment is trimmed and kept in order.
pub fn parse_labels(content: &str) -> Vec<String> {
	content
		.trim()
		.split(BULLET)
		.skip(1)
		.map(|segment| segment.trim().to_owned())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn path(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn prompt_embeds_chain_and_target() {
		let prompt = build_prompt(&path(&["Chef", "Kitchen", "Prep"]));
		assert!(prompt.contains("Chef > Kitchen > Prep\n"));
		assert!(prompt.contains("Split \"Prep\" into the following three roles."));
		assert!(prompt.contains("exactly three"));
	}

	#[test]
	fn bullets_become_labels() {
		let labels = parse_labels("* Buy produce\n* Wash\n*   Chop  \n");
		assert_eq!(labels, vec!["Buy produce", "Wash", "Chop"]);
	}

	#[test]
	fn preamble_before_first_bullet_is_dropped() {
		let labels = parse_labels("Here you go:\n* One\n* Two");
		assert_eq!(labels, vec!["One", "Two"]);
	}

	#[test]
	fn text_without_bullets_yields_nothing() {
		assert!(parse_labels("no list here").is_empty());
		assert!(parse_labels("").is_empty());
	}
}
