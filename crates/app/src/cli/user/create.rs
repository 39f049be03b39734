use clap::Args;
use martina_app::{
    database::{self, Db},
    domain::users::{
        PgUsersService, UsersService,
        models::{AddressUuid, NewAddress, NewUser, UserRole, UserUuid},
        token::{generate_api_token, hash_api_token},
    },
};

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Contact email; one of email or phone is required
    #[arg(long, required_unless_present = "phone")]
    email: Option<String>,

    /// Contact phone number
    #[arg(long)]
    phone: Option<String>,

    /// Role, e.g. `CUSTOMER`, `VENDOR` or `ADMIN`
    #[arg(long, default_value = "CUSTOMER")]
    role: UserRole,

    /// Delivery address line, repeat for multi-line addresses
    #[arg(long = "address-line")]
    address_lines: Vec<String>,

    /// Optional raw API token; generated when omitted
    #[arg(long)]
    token: Option<String>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let raw_token = args.token.unwrap_or_else(generate_api_token);

    if raw_token.trim().is_empty() {
        return Err("token cannot be empty".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgUsersService::new(Db::new(pool));

    let user = service
        .create_user(NewUser {
            uuid: UserUuid::new(),
            name: args.name,
            email: args.email,
            phone: args.phone,
            role: args.role,
            token_hash: hash_api_token(&raw_token),
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("user_role: {}", user.role);

    if !args.address_lines.is_empty() {
        let address = service
            .create_address(
                user.uuid,
                NewAddress {
                    uuid: AddressUuid::new(),
                    lines: args.address_lines,
                },
            )
            .await
            .map_err(|error| format!("failed to create address: {error}"))?;

        println!("address_uuid: {}", address.uuid);
    }

    println!("api_token: {raw_token}");
    println!("store this token now; it is only shown once");

    Ok(())
}
