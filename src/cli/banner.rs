use colored::*;
use rand::seq::IndexedRandom;

pub const AUTHOR: &str = "@bruuhim";

const BANNER: &str = r"
    ▄████████ ███▄▄▄▄    ▄█     █▄     ▄████████  ▄██████▄   ▄█        ████████▄
   ███    ███ ███▀▀▀██▄ ███     ███   ███    ███ ███    ███ ███        ███   ▀███
   ███    ███ ███   ███ ███     ███   ███    █▀  ███    ███ ███        ███    ███
   ███    ███ ███   ███ ███     ███  ▄███▄▄▄     ███    ███ ███        ███    ███
 ▀███████████ ███   ███ ███     ███ ▀▀███▀▀▀     ███    ███ ███        ███    ███
   ███    ███ ███   ███ ███     ███   ███        ███    ███ ███        ███    ███
   ███    ███ ███   ███ ███ ▄█▄ ███   ███        ███    ███ ███▌    ▄  ███   ▄███
   ███    █▀   ▀█   █▀   ▀███▀███▀    ███         ▀██████▀  █████▄▄██  ████████▀
                                                             ▀";

const TAGLINE: &str = "          Set custom anime folder icons from DeviantArt! 🎨";

pub const QUOTES: &[&str] = &[
    "🌸 'Believe in the me that believes in you!' - Kamina",
    "⚡ 'I'll take a potato chip... and EAT IT!' - Light Yagami",
    "🔥 'Plus Ultra!' - All Might",
    "✨ 'People die when they are killed!' - Shirou Emiya",
    "💪 'Omae wa mou shindeiru.' - Kenshiro",
    "🎌 'The world isn't perfect, but it's there for us trying the best it can.' - Roy Mustang",
    "🌟 'If you don't take risks, you can't create a future!' - Monkey D. Luffy",
    "🌙 'Power isn't determined by your size, but how much you extend yourself.' - One Piece",
    "🔮 'A lesson without pain is meaningless.' - Edward Elric",
    "⚔️ 'The blade is me, and I am the blade.' - Ichigo Kurosaki",
    "🍜 'Grab your chopsticks and let's eat!' - Naruto Uzumaki",
    "🎭 'I am the bone of my sword.' - Archer",
    "🌌 'In this world, wherever there is light, there are also shadows.' - Lelouch",
    "🐉 'This is my ninja way!' - Rock Lee",
    "💎 'The power to be strong and having the will to use it... that's what makes a real hero.' - Midoriya",
    "🎨 'Art is a explosion!' - Sebastian Michaelis",
];

const SUCCESS_ART: &str = "
    ╔═══════════════════════════════════════╗
    ║                                       ║
    ║      SUCCESS! FOLDER UPGRADED!        ║
    ║                                       ║
    ╚═══════════════════════════════════════╝";

pub fn rule() -> ColoredString {
    "=".repeat(60).bold().magenta()
}

/// Banner plus one quote drawn from `quotes`.
pub fn show_banner(quotes: &[&str]) {
    println!("{}", BANNER.magenta());
    println!("{}\n", TAGLINE.cyan());
    if let Some(quote) = quotes.choose(&mut rand::rng()) {
        println!("{}\n", quote.yellow());
    }
}

pub fn show_header(version: &str) {
    println!("{}", rule());
    println!(
        "{}",
        format!("🎌  AniFold v{} - Anime Folder Icon Setter  🎌", version)
            .bold()
            .cyan()
    );
    println!("{}", format!("    Created by {} with ❤️", AUTHOR).yellow());
}

pub fn show_success_art() {
    println!("{}\n", SUCCESS_ART.green());
}
