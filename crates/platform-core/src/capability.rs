//! Capability reporting shared by the platform crates.

/// A system capability that MouseKeys may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

impl Capability {
    pub fn status(&self) -> &'static str {
        if self.available {
            "[OK]"
        } else if self.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        }
    }
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("MouseKeys System Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        println!("  {} {}: {}", cap.status(), cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}
