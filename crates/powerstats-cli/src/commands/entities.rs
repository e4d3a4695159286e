use super::{ProviderOptions, make_stats, print_json};

pub fn run(opts: &ProviderOptions<'_>, json: bool) {
    let stats = make_stats(opts);
    let entities = stats.list_entities();

    if json {
        print_json(&entities);
        return;
    }

    if entities.is_empty() {
        println!("No power entities registered.");
        return;
    }

    println!("{:>4}  {:<24} States", "ID", "Entity");
    println!("{}", "-".repeat(60));
    for entity in &entities {
        let states: Vec<String> = entity
            .states
            .iter()
            .map(|s| format!("{}:{}", s.state_id, s.state_name))
            .collect();
        println!(
            "{:>4}  {:<24} {}",
            entity.entity_id,
            entity.entity_name,
            states.join(", ")
        );
    }
    println!();
    println!("{} entities", entities.len());
}
