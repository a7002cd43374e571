use clap::{Parser, ValueEnum};
use recipe_client::{AttrKind, Recipe, RecipeClientHttp, RecipeClientTrait, RecipeDraft};
use rust_decimal::Decimal;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
struct Cli {
    #[clap(short, long)]
    server: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Tags,
    Ingredients,
}

impl From<Kind> for AttrKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Tags => AttrKind::Tags,
            Kind::Ingredients => AttrKind::Ingredients,
        }
    }
}

#[derive(Parser, Debug)]
enum Command {
    Register {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long, default_value = "")]
        name: String,
    },
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Me,
    UpdateMe {
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        password: Option<String>,
    },
    ListAttrs {
        kind: Kind,
        #[clap(long)]
        assigned_only: bool,
    },
    CreateAttr {
        kind: Kind,
        name: String,
    },
    RenameAttr {
        kind: Kind,
        id: Uuid,
        name: String,
    },
    DeleteAttr {
        kind: Kind,
        id: Uuid,
    },
    ListRecipes {
        #[clap(long, value_delimiter = ',')]
        tags: Vec<Uuid>,
        #[clap(long, value_delimiter = ',')]
        ingredients: Vec<Uuid>,
    },
    GetRecipe {
        id: Uuid,
    },
    CreateRecipe {
        #[clap(long)]
        title: String,
        #[clap(long)]
        time_minutes: i32,
        #[clap(long)]
        price: Decimal,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        link: Option<String>,
        #[clap(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[clap(long, value_delimiter = ',')]
        ingredients: Vec<String>,
    },
    UpdateRecipe {
        id: Uuid,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        time_minutes: Option<i32>,
        #[clap(long)]
        price: Option<Decimal>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        link: Option<String>,
        /// Replaces all tags; pass an empty string to clear them.
        #[clap(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        #[clap(long, value_delimiter = ',')]
        ingredients: Option<Vec<String>>,
    },
    DeleteRecipe {
        id: Uuid,
    },
    UploadImage {
        id: Uuid,
        path: PathBuf,
    },
}

fn non_empty(names: Vec<String>) -> Vec<String> {
    names.into_iter().filter(|n| !n.trim().is_empty()).collect()
}

fn print_recipe(recipe: &Recipe) {
    let tags: Vec<&str> = recipe.tags.iter().map(|t| t.name.as_str()).collect();
    let ingredients: Vec<&str> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
    println!(
        "- [{}] {} ({} min, {}) tags: [{}] ingredients: [{}]",
        recipe.id,
        recipe.title,
        recipe.time_minutes,
        recipe.price,
        tags.join(", "),
        ingredients.join(", ")
    );
    if let Some(description) = recipe.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {}", description);
    }
    if let Some(image) = &recipe.image {
        println!("  image: {}", image);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let endpoint = args.server.as_deref().unwrap_or("http://127.0.0.1:8080");
    let mut client = RecipeClientHttp::connect(endpoint).await?;

    match args.command {
        Command::Register {
            email,
            password,
            name,
        } => {
            let user = client.register(email, password, name).await?;
            println!("Registered {}", user.email);
        }
        Command::Login { email, password } => {
            client.login(email, password).await?;
            println!("Successfully logged in!");
        }
        Command::Me => {
            let user = client.me().await?;
            println!("{} <{}>", user.name, user.email);
        }
        Command::UpdateMe { name, password } => {
            let user = client.update_me(name, password).await?;
            println!("Profile updated: {} <{}>", user.name, user.email);
        }
        Command::ListAttrs {
            kind,
            assigned_only,
        } => {
            let items = client.list_attrs(kind.into(), assigned_only).await?;
            for item in items {
                println!("- [{}] {}", item.id, item.name);
            }
        }
        Command::CreateAttr { kind, name } => {
            let item = client.create_attr(kind.into(), name).await?;
            println!("Created [{}] {}", item.id, item.name);
        }
        Command::RenameAttr { kind, id, name } => {
            let item = client.rename_attr(kind.into(), id, name).await?;
            println!("Renamed [{}] {}", item.id, item.name);
        }
        Command::DeleteAttr { kind, id } => {
            client.delete_attr(kind.into(), id).await?;
            println!("Deleted!");
        }
        Command::ListRecipes { tags, ingredients } => {
            let recipes = client.list_recipes(tags, ingredients).await?;
            println!("Recipes ({})", recipes.len());
            for recipe in &recipes {
                print_recipe(recipe);
            }
        }
        Command::GetRecipe { id } => {
            let recipe = client.get_recipe(id).await?;
            print_recipe(&recipe);
        }
        Command::CreateRecipe {
            title,
            time_minutes,
            price,
            description,
            link,
            tags,
            ingredients,
        } => {
            let draft = RecipeDraft {
                title: Some(title),
                time_minutes: Some(time_minutes),
                price: Some(price),
                description,
                link,
                tags: Some(non_empty(tags)),
                ingredients: Some(non_empty(ingredients)),
            };
            let recipe = client.create_recipe(draft).await?;
            println!("Recipe created! ID: {}", recipe.id);
        }
        Command::UpdateRecipe {
            id,
            title,
            time_minutes,
            price,
            description,
            link,
            tags,
            ingredients,
        } => {
            let draft = RecipeDraft {
                title,
                time_minutes,
                price,
                description,
                link,
                tags: tags.map(non_empty),
                ingredients: ingredients.map(non_empty),
            };
            let recipe = client.update_recipe(id, draft).await?;
            print_recipe(&recipe);
        }
        Command::DeleteRecipe { id } => {
            client.delete_recipe(id).await?;
            println!("Recipe deleted!");
        }
        Command::UploadImage { id, path } => {
            let image = client.upload_image(id, &path).await?;
            println!("Image stored at {}", image.unwrap_or_default());
        }
    }

    Ok(())
}
