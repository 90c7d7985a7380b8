use std::error::Error;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{
    Actor, Discount, Engine, MoneyCents, NewBoardCmd, NewCouponCmd, NewDailyOfferCmd,
    PaymentMethod, PaymentResultCmd, Percent, QuoteCmd, Reconciler, ReserveCmd, UnitRef,
    WalletOwner, WithdrawFilter, WithdrawStatus, Window,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "rentbook_admin")]
#[command(about = "Admin utilities for the rentbook marketplace")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./rentbook.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Partner(Partner),
    Staff(Staff),
    Board(Board),
    Daily(Daily),
    Coupon(Coupon),
    Platform(Platform),
    /// Price a window without reserving it.
    Quote(Target),
    Reserve(ReserveArgs),
    Booking(Booking),
    Payment(Payment),
    Balance(BalanceArgs),
    Withdraw(Withdraw),
    /// Run one reconciler pass.
    Sweep,
}

#[derive(Args, Debug)]
struct Partner {
    #[command(subcommand)]
    command: PartnerCommand,
}

#[derive(Subcommand, Debug)]
enum PartnerCommand {
    Add {
        #[arg(long)]
        name: String,
        /// Commission override in percent.
        #[arg(long)]
        commission: Option<Percent>,
    },
    /// Set the commission override; omit `--percent` to fall back to the platform value.
    Commission {
        #[arg(long)]
        partner: Uuid,
        #[arg(long)]
        percent: Option<Percent>,
    },
}

#[derive(Args, Debug)]
struct Staff {
    #[command(subcommand)]
    command: StaffCommand,
}

#[derive(Subcommand, Debug)]
enum StaffCommand {
    Add {
        #[arg(long)]
        partner: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        commission: Option<Percent>,
    },
}

#[derive(Args, Debug)]
struct Board {
    #[command(subcommand)]
    command: BoardCommand,
}

#[derive(Subcommand, Debug)]
enum BoardCommand {
    Add {
        #[arg(long)]
        partner: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        capacity: i64,
        /// Hourly price, e.g. `1000` or `1000.50`.
        #[arg(long)]
        price: MoneyCents,
        #[arg(long)]
        location: Option<String>,
    },
}

#[derive(Args, Debug)]
struct Daily {
    #[command(subcommand)]
    command: DailyCommand,
}

#[derive(Subcommand, Debug)]
enum DailyCommand {
    Add {
        #[arg(long)]
        partner: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        quantity: i64,
        /// Daily price.
        #[arg(long)]
        price: MoneyCents,
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Args, Debug)]
struct Coupon {
    #[command(subcommand)]
    command: CouponCommand,
}

#[derive(Subcommand, Debug)]
enum CouponCommand {
    Add {
        #[arg(long)]
        code: String,
        #[arg(long, conflicts_with = "fixed", required_unless_present = "fixed")]
        percent: Option<Percent>,
        #[arg(long)]
        fixed: Option<MoneyCents>,
        #[arg(long)]
        max_uses: Option<i64>,
        #[arg(long)]
        valid_from: Option<NaiveDate>,
        #[arg(long)]
        valid_to: Option<NaiveDate>,
    },
}

#[derive(Args, Debug)]
struct Platform {
    #[command(subcommand)]
    command: PlatformCommand,
}

#[derive(Subcommand, Debug)]
enum PlatformCommand {
    /// Store the platform commission; omit `--percent` to use the configured default.
    Commission {
        #[arg(long)]
        percent: Option<Percent>,
    },
}

/// Unit and window to price or reserve.
#[derive(Args, Debug)]
struct Target {
    #[arg(long, conflicts_with = "daily", required_unless_present = "daily")]
    board: Option<Uuid>,
    #[arg(long)]
    daily: Option<Uuid>,
    /// Local date, `YYYY-MM-DD`.
    #[arg(long)]
    date: NaiveDate,
    /// Local start time for boards, `HH:MM`.
    #[arg(long, value_parser = parse_time, required_unless_present = "daily")]
    start: Option<NaiveTime>,
    #[arg(long, default_value_t = 60)]
    minutes: i64,
    #[arg(long, default_value_t = 1)]
    days: i64,
    #[arg(long, default_value_t = 1)]
    quantity: i64,
    #[arg(long)]
    coupon: Option<String>,
}

impl Target {
    fn quote_cmd(&self) -> Result<QuoteCmd, Box<dyn Error + Send + Sync>> {
        let (unit, window) = match (self.board, self.daily, self.start) {
            (Some(board_id), None, Some(start)) => (
                UnitRef::Board { board_id },
                Window::hourly(self.date, start, self.minutes),
            ),
            (None, Some(offer_id), _) => (
                UnitRef::Daily { offer_id },
                Window::daily(self.date, self.days),
            ),
            _ => return Err("pass --board with --start, or --daily".into()),
        };
        let cmd = QuoteCmd::new(unit, window, self.quantity);
        Ok(match &self.coupon {
            Some(code) => cmd.coupon(code.clone()),
            None => cmd,
        })
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    Online,
    Card,
    Cash,
}

impl From<Method> for PaymentMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Online => PaymentMethod::Online,
            Method::Card => PaymentMethod::CardTransfer,
            Method::Cash => PaymentMethod::Cash,
        }
    }
}

#[derive(Args, Debug)]
struct ReserveArgs {
    /// Customer chat id.
    #[arg(long)]
    user: i64,
    #[arg(long, value_enum, default_value_t = Method::Online)]
    method: Method,
    #[command(flatten)]
    target: Target,
}

#[derive(Args, Debug)]
struct Booking {
    #[command(subcommand)]
    command: BookingCommand,
}

#[derive(Args, Debug)]
struct BookingAction {
    #[arg(long)]
    id: Uuid,
    /// `admin`, `system`, `owner:<chat id>`, `partner:<uuid>` or `staff:<uuid>`.
    #[arg(long = "as", value_parser = parse_actor, default_value = "admin")]
    actor: Actor,
}

#[derive(Subcommand, Debug)]
enum BookingCommand {
    Confirm(BookingAction),
    Cancel(BookingAction),
    Complete(BookingAction),
    Show {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct Payment {
    #[command(subcommand)]
    command: PaymentCommand,
}

#[derive(Subcommand, Debug)]
enum PaymentCommand {
    /// Apply a provider notification by hand.
    Record {
        #[arg(long)]
        booking: Uuid,
        #[arg(long)]
        provider_ref: String,
        #[arg(long)]
        amount: MoneyCents,
        #[arg(long)]
        failed: bool,
    },
}

#[derive(Args, Debug)]
struct BalanceArgs {
    #[arg(long, conflicts_with = "staff", required_unless_present = "staff")]
    partner: Option<Uuid>,
    #[arg(long)]
    staff: Option<Uuid>,
}

#[derive(Args, Debug)]
struct Withdraw {
    #[command(subcommand)]
    command: WithdrawCommand,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Status {
    Pending,
    Approved,
    Rejected,
}

impl From<Status> for WithdrawStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => WithdrawStatus::Pending,
            Status::Approved => WithdrawStatus::Approved,
            Status::Rejected => WithdrawStatus::Rejected,
        }
    }
}

#[derive(Subcommand, Debug)]
enum WithdrawCommand {
    Request {
        #[arg(long)]
        partner: Uuid,
        #[arg(long)]
        amount: MoneyCents,
    },
    Approve {
        #[arg(long)]
        id: Uuid,
    },
    Reject {
        #[arg(long)]
        id: Uuid,
    },
    List {
        #[arg(long)]
        partner: Option<Uuid>,
        #[arg(long, value_enum)]
        status: Option<Status>,
    },
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|err| format!("expected HH:MM: {err}"))
}

fn parse_actor(raw: &str) -> Result<Actor, String> {
    let (role, id) = raw.split_once(':').unwrap_or((raw, ""));
    let uuid = |id: &str| Uuid::parse_str(id).map_err(|err| format!("invalid id {id}: {err}"));
    match role {
        "admin" => Ok(Actor::Admin),
        "system" => Ok(Actor::System),
        "owner" => id
            .parse::<i64>()
            .map(Actor::Owner)
            .map_err(|err| format!("invalid chat id {id}: {err}")),
        "partner" => uuid(id).map(Actor::Partner),
        "staff" => uuid(id).map(Actor::Staff),
        other => Err(format!("unknown actor: {other}")),
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Partner(Partner { command }) => match command {
            PartnerCommand::Add { name, commission } => {
                let partner_id = engine.new_partner(&name, commission).await?;
                println!("created partner: {name} ({partner_id})");
            }
            PartnerCommand::Commission { partner, percent } => {
                engine.set_partner_commission(partner, percent).await?;
                let effective = engine.effective_commission(partner).await?;
                println!("partner {partner} commission: {effective}");
            }
        },
        Command::Staff(Staff {
            command:
                StaffCommand::Add {
                    partner,
                    name,
                    commission,
                },
        }) => {
            let staff_id = engine.new_staff(partner, &name, commission).await?;
            println!("created staff: {name} ({staff_id})");
        }
        Command::Board(Board {
            command:
                BoardCommand::Add {
                    partner,
                    name,
                    capacity,
                    price,
                    location,
                },
        }) => {
            let mut cmd = NewBoardCmd::new(partner, name.clone(), capacity, price);
            if let Some(location) = location {
                cmd = cmd.location(location);
            }
            let board_id = engine.new_board(cmd).await?;
            println!("created board: {name} ({board_id})");
        }
        Command::Daily(Daily {
            command:
                DailyCommand::Add {
                    partner,
                    name,
                    quantity,
                    price,
                    address,
                },
        }) => {
            let mut cmd = NewDailyOfferCmd::new(partner, name.clone(), quantity, price);
            if let Some(address) = address {
                cmd = cmd.address(address);
            }
            let offer_id = engine.new_daily_offer(cmd).await?;
            println!("created daily offer: {name} ({offer_id})");
        }
        Command::Coupon(Coupon {
            command:
                CouponCommand::Add {
                    code,
                    percent,
                    fixed,
                    max_uses,
                    valid_from,
                    valid_to,
                },
        }) => {
            let discount = match (percent, fixed) {
                (Some(percent), _) => Discount::Percent(percent),
                (None, Some(fixed)) => Discount::Fixed(fixed),
                (None, None) => return Err("--percent or --fixed is required".into()),
            };
            let mut cmd =
                NewCouponCmd::new(code.clone(), discount).valid_between(valid_from, valid_to);
            if let Some(max_uses) = max_uses {
                cmd = cmd.max_uses(max_uses);
            }
            engine.new_coupon(cmd).await?;
            println!("created coupon: {code}");
        }
        Command::Platform(Platform {
            command: PlatformCommand::Commission { percent },
        }) => {
            engine.set_platform_commission(percent).await?;
            match percent {
                Some(percent) => println!("platform commission: {percent}"),
                None => println!(
                    "platform commission: {} (default)",
                    engine.settings().platform_commission
                ),
            }
        }
        Command::Quote(target) => {
            let quote = engine.quote(&target.quote_cmd()?).await?;
            println!("base: {}", quote.base_amount);
            if let Some(code) = &quote.coupon {
                println!("coupon: {code}");
            }
            println!("total: {}", quote.amount);
        }
        Command::Reserve(args) => {
            let quote = args.target.quote_cmd()?;
            let mut cmd = ReserveCmd::new(
                args.user,
                quote.unit,
                quote.window,
                quote.quantity,
                args.method.into(),
            );
            if let Some(code) = quote.coupon {
                cmd = cmd.coupon(code);
            }
            let booking_id = engine.reserve(cmd).await?;
            let booking = engine.booking(booking_id).await?;
            println!(
                "reserved: {booking_id} ({}, {})",
                booking.status.as_str(),
                booking.amount
            );
        }
        Command::Booking(Booking { command }) => match command {
            BookingCommand::Confirm(action) => {
                engine.confirm_booking(action.id, action.actor).await?;
                println!("confirmed: {}", action.id);
            }
            BookingCommand::Cancel(action) => {
                engine.cancel_booking(action.id, action.actor).await?;
                println!("canceled: {}", action.id);
            }
            BookingCommand::Complete(action) => {
                let completion = engine.complete_booking(action.id, action.actor).await?;
                println!("completed: {}", action.id);
                if let Some(op) = completion.partner_credit {
                    println!("partner credited: {}", op.amount);
                }
                if let Some(op) = completion.staff_credit {
                    println!("staff credited: {}", op.amount);
                }
            }
            BookingCommand::Show { id } => {
                let booking = engine.booking(id).await?;
                println!("id: {}", booking.id);
                println!("unit: {}", booking.unit);
                println!("user: {}", booking.user_id);
                println!(
                    "window: {} to {}",
                    booking.window_start, booking.window_end
                );
                println!("quantity: {}", booking.quantity);
                println!("amount: {}", booking.amount);
                println!("status: {}", booking.status.as_str());
                println!(
                    "payment: {} ({})",
                    booking.payment_status.as_str(),
                    booking.payment_method.as_str()
                );
                if let Some(deadline) = booking.payment_deadline {
                    println!("pay before: {deadline}");
                }
            }
        },
        Command::Payment(Payment {
            command:
                PaymentCommand::Record {
                    booking,
                    provider_ref,
                    amount,
                    failed,
                },
        }) => {
            let currency = engine.settings().currency;
            let cmd = if failed {
                PaymentResultCmd::failed(booking, provider_ref, amount, currency)
            } else {
                PaymentResultCmd::succeeded(booking, provider_ref, amount, currency)
            };
            engine.record_payment_result(cmd).await?;
            println!("payment recorded for {booking}");
        }
        Command::Balance(BalanceArgs { partner, staff }) => {
            let owner = match (partner, staff) {
                (Some(partner_id), _) => WalletOwner::partner(partner_id),
                (None, Some(staff_id)) => WalletOwner::staff(staff_id),
                (None, None) => return Err("--partner or --staff is required".into()),
            };
            println!("balance: {}", engine.balance(owner).await?);
        }
        Command::Withdraw(Withdraw { command }) => match command {
            WithdrawCommand::Request { partner, amount } => {
                let request_id = engine.request_withdrawal(partner, amount).await?;
                println!("withdrawal requested: {request_id}");
            }
            WithdrawCommand::Approve { id } => {
                let op = engine.approve_withdrawal(id).await?;
                println!("approved: {id} (debited {})", op.amount);
            }
            WithdrawCommand::Reject { id } => {
                engine.reject_withdrawal(id).await?;
                println!("rejected: {id}");
            }
            WithdrawCommand::List { partner, status } => {
                let filter = WithdrawFilter {
                    partner_id: partner,
                    status: status.map(Into::into),
                };
                for request in engine.withdrawals(&filter).await? {
                    println!(
                        "{}  {}  {}  {}  {}",
                        request.id,
                        request.partner_id,
                        request.amount,
                        request.status.as_str(),
                        request.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        },
        Command::Sweep => {
            let engine = std::sync::Arc::new(engine);
            let report = Reconciler::new(engine).sweep().await?;
            println!(
                "completed: {}, credited: {}, expired: {}, failed: {}",
                report.completed, report.credited, report.expired, report.failed
            );
        }
    }

    Ok(())
}
