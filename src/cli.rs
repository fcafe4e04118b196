use pctechlibrary::libpctech::calculator::{format_kyat, BuildEstimate};
use pctechlibrary::libpctech::comments::{stars, Comment, ANONYMOUS};
use pctechlibrary::libpctech::content::{Fragment, Inline};
use pctechlibrary::libpctech::quiz::{DisplayedQuestion, OptionMark, Quiz, Step};
use pctechlibrary::libpctech::search::{SearchEngine, SearchOutcome};
use crate::Error;
use colored::Colorize;
use log::debug;
use rand::rng;
use std::io::{self, Write};
use text_io::read;

#[derive(Debug, PartialEq)]
enum Choice {
    Option(usize),
    Invalid,
    Quit,
}

impl Choice {
    fn from_str(choices_count: usize, input: &str) -> Choice {
        match input.trim() {
            "q" => Choice::Quit,
            input => match input.parse::<usize>() {
                Ok(num) if num >= 1 && num <= choices_count => Choice::Option(num - 1),
                Ok(_) => {
                    println!(
                        "{}",
                        format!("There are only {} options available!", choices_count)
                            .bright_red()
                    );
                    Choice::Invalid
                }
                Err(_) => Choice::Invalid,
            },
        }
    }
}

fn prompt(text: &str) -> io::Result<String> {
    print!("{} ", text.cyan());
    io::stdout().flush()?;
    let line: String = read!("{}\n");
    Ok(line)
}

pub fn confirm(question: &str) -> bool {
    matches!(
        prompt(&format!("{} (y/N):", question)).as_deref().map(str::trim),
        Ok("y") | Ok("Y") | Ok("yes")
    )
}

fn print_question(question: &DisplayedQuestion) -> String {
    let leading = format!("{}. ", question.counter_label);
    println!(
        "{}{}",
        leading.cyan(),
        question.prompt.black().bold().on_white()
    );
    let indent = " ".repeat(leading.chars().count());
    for (i, option) in question.options.iter().enumerate() {
        println!("{}{}. {}", indent, format!("{}", i + 1).bold(), option);
    }
    indent
}

pub fn quiz_loop(quiz: &mut Quiz) -> Result<(), Error> {
    let mut rng = rng();
    let mut step = quiz.start(&mut rng);

    loop {
        match step {
            Step::Question(question) => {
                let indent = print_question(&question);
                let feedback = loop {
                    let input = prompt(&format!(
                        "Answer (1-{}, q to quit):",
                        question.options.len()
                    ))?;
                    let choice = Choice::from_str(question.options.len(), &input);
                    debug!("choice: {:?}", choice);
                    match choice {
                        Choice::Option(num) => {
                            if let Some(feedback) = quiz.submit_answer(num) {
                                break feedback;
                            }
                        }
                        Choice::Invalid => continue,
                        Choice::Quit => {
                            println!("{}", "Quitting Early!".cyan());
                            return Ok(());
                        }
                    }
                };

                for (i, option) in question.options.iter().enumerate() {
                    let line = format!("{}{}. {}", indent, i + 1, option);
                    match feedback.mark(i) {
                        OptionMark::Correct => println!("{}", line.bright_green()),
                        OptionMark::Wrong => println!("{}", line.bright_red().strikethrough()),
                        OptionMark::Plain => println!("{}", line.dimmed()),
                    }
                }
                if feedback.correct {
                    println!("{}", feedback.message.bright_green());
                } else {
                    println!("{}", feedback.message.bright_red());
                }

                prompt("Press Enter for the next question...")?;
                step = match quiz.advance(&mut rng) {
                    Some(next) => next,
                    None => return Ok(()),
                };
            }
            Step::Finished(result) => {
                println!(
                    "{}",
                    format!("==========> {} <==========", result.score_label()).cyan()
                );
                println!("{}", result.tier.headline().bold());
                println!("{}", result.tier.sub_message());
                if !confirm("Play again?") {
                    return Ok(());
                }
                step = quiz.restart(&mut rng);
            }
        }
    }
}

fn styled(fragment: &Fragment) -> String {
    fragment
        .runs()
        .iter()
        .map(|run| match run {
            Inline::Text(text) => text.normal().to_string(),
            Inline::Mark(text) => text.black().on_yellow().to_string(),
        })
        .collect()
}

pub fn print_search(engine: &SearchEngine, outcome: &SearchOutcome) {
    let tabs: Vec<String> = engine
        .tabs()
        .iter()
        .map(|tab| {
            let name = tab.category.to_string();
            if tab.active {
                format!("[{}]", name).bold().to_string()
            } else {
                name
            }
        })
        .collect();
    println!("{}", tabs.join("  "));

    for card in engine.cards().iter().filter(|c| c.visible) {
        println!(
            "{} {}",
            card.title.cyan().bold(),
            format!("({})", card.category).dimmed()
        );
        for section in card.sections.iter().filter(|s| s.visible) {
            let marker = if section.open { "▾" } else { "▸" };
            println!("  {} {}", marker, styled(&section.summary));
            if section.open {
                for paragraph in &section.paragraphs {
                    println!("      {}", styled(paragraph));
                }
            }
        }
    }

    if let Some(message) = &outcome.no_results {
        println!("{}", message.yellow());
    }
}

pub fn print_comments(comments: &[Comment]) {
    if comments.is_empty() {
        println!("{}", "No comments yet. Be the first!".dimmed());
        return;
    }
    for c in comments {
        let name = if c.name.is_empty() { ANONYMOUS } else { c.name.as_str() };
        let rating = if c.rating > 0 {
            format!(" {}", stars(c.rating)).yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "👤 {}{} {} {}",
            name.bold(),
            rating,
            format!("[{}]", c.topic).blue(),
            c.id.dimmed()
        );
        println!("   {}", c.text);
        println!("   {}", format!("🕐 {}", c.display_time).dimmed());
    }
}

pub fn print_estimate(estimate: &BuildEstimate) {
    for choice in &estimate.breakdown {
        println!("{}: {}", choice.part, choice.label.bold());
        println!("   {}", format!("→ {}", format_kyat(choice.price)).cyan());
    }
    println!(
        "{} {}",
        "Total:".bold(),
        format_kyat(estimate.total).bright_green()
    );
    println!("{}", estimate.tier.label());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parsing() {
        assert_eq!(Choice::from_str(4, "q"), Choice::Quit);
        assert_eq!(Choice::from_str(4, "1"), Choice::Option(0));
        assert_eq!(Choice::from_str(4, " 4 "), Choice::Option(3));
        assert_eq!(Choice::from_str(4, "5"), Choice::Invalid);
        assert_eq!(Choice::from_str(4, "0"), Choice::Invalid);
        assert_eq!(Choice::from_str(4, "maybe"), Choice::Invalid);
    }
}
