//! `groundwell retrieve`: show the knowledge context a query would get.

pub fn run(query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let knowledge = super::knowledge(&config)?;

    let matched = knowledge.matching(query);
    println!();
    if matched.is_empty() {
        println!("  No section matched; using fallback '{}'", knowledge.fallback().id);
    } else {
        println!("  Matched {} section(s):", matched.len());
        for section in &matched {
            println!("    - {} ({})", section.id, section.title);
        }
    }
    println!();
    println!("{}", knowledge.retrieve(query));
    Ok(())
}
