//! Check system capabilities.

use mousekeys_actuator::EnigoActuator;
use mousekeys_platform_core::{print_capability_report, Actuator, Capability};

pub fn run() -> anyhow::Result<()> {
    println!("MouseKeys System Check");
    println!("{}", "=".repeat(50));
    println!(
        "[OK] Platform: {} ({})",
        std::env::consts::OS,
        mousekeys_input_capture::platform_name()
    );

    let mut capabilities = mousekeys_input_capture::check_capabilities();
    capabilities.push(pointer_capability());

    println!();
    print_capability_report(&capabilities);

    let all_required_ok = capabilities
        .iter()
        .filter(|c| c.required)
        .all(|c| c.available);

    println!();
    if all_required_ok {
        println!("All required capabilities are available. MouseKeys is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}

fn pointer_capability() -> Capability {
    let probe = EnigoActuator::new().and_then(|actuator| actuator.screen_size());
    match probe {
        Ok((width, height)) => Capability {
            name: "Pointer Control".to_string(),
            description: format!("Main display {width}x{height}"),
            available: true,
            required: true,
            fix_instructions: None,
        },
        Err(e) => Capability {
            name: "Pointer Control".to_string(),
            description: e.to_string(),
            available: false,
            required: true,
            fix_instructions: Some(
                "Grant input-injection access (Accessibility on macOS, an X11/uinput session on Linux)"
                    .to_string(),
            ),
        },
    }
}
