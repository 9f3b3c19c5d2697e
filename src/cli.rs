//! Command-line front end: argument parsing and one handler per command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use crate::api::{ApiClient, ApiError, ApiResult, AuthApi, ImageFile};
use crate::backoffice::{inquiry_query, AppointmentFilter, StatusFilter};
use crate::config::Config;
use crate::forms::{
    self, time_slots, AppointmentForm, FieldErrors, InquiryForm, LoginForm, PropertyForm,
    RegisterForm, AMENITIES,
};
use crate::listing::{
    featured, format_price, mappable, result_label, thumbnail, ListingFilters, SortOrder,
    ViewMode, PRICE_RANGES,
};
use crate::models::{
    Appointment, AppointmentStatus, Inquiry, InquiryStatus, Property, PropertyQuery,
    PropertyStatus, PropertyType, PropertyUpdate, Role, StatusQuery,
};
use crate::notify::{Notice, Notifier};
use crate::session::{Access, AuthSession, GuardDecision, SessionStore};

/// Browse listings, send inquiries, book viewings and manage the agent portal.
#[derive(Parser, Debug)]
#[command(name = "estate-portal", version)]
pub struct Cli {
    /// Base URL of the REST API, including `/api`.
    #[arg(long, global = true, env = "ESTATE_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding the cached session.
    #[arg(long, global = true, env = "ESTATE_SESSION_DIR")]
    pub session_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Keep the session in memory only; nothing is read from or written to disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply command-line overrides on top of the environment.
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(dir) = &self.session_dir {
            config.session_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and cache the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ESTATE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account.
    Register(RegisterArgs),
    /// Forget the cached session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    #[command(subcommand)]
    Properties(PropertyCommand),
    #[command(subcommand)]
    Inquiries(InquiryCommand),
    #[command(subcommand)]
    Appointments(AppointmentCommand),
    /// List the viewing times that can be booked.
    Slots,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "ESTATE_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Defaults to the password.
    #[arg(long)]
    pub confirm_password: Option<String>,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub phone: Option<String>,
    /// user or agent
    #[arg(long, default_value = "user")]
    pub role: Role,
}

#[derive(Subcommand, Debug)]
pub enum PropertyCommand {
    /// Browse listings with the listings-page filters.
    List {
        #[arg(long = "type", default_value = "all")]
        property_type: String,
        /// Price bracket key, e.g. 1000000-2500000
        #[arg(long, default_value = "all")]
        price: String,
        /// Minimum bedrooms
        #[arg(long, default_value = "all")]
        beds: String,
        /// featured, price-low, price-high, newest or beds
        #[arg(long, default_value = "featured")]
        sort: String,
        #[arg(long, default_value = "grid")]
        view: ViewMode,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        /// Only print listings that can be placed on a map.
        #[arg(long)]
        map: bool,
    },
    /// Print the accepted values for the list filters.
    Filters,
    /// Featured listings, as on the homepage.
    Featured {
        #[arg(long, default_value_t = 6)]
        limit: usize,
    },
    Show {
        id: String,
    },
    /// Listings owned by the signed-in agent.
    Mine,
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete {
        id: String,
    },
    UploadImages {
        id: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    DeleteImage {
        id: String,
        image_url: String,
    },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long, default_value_t = 1)]
    pub beds: u32,
    #[arg(long, default_value_t = 1.0)]
    pub baths: f32,
    #[arg(long, default_value_t = 0)]
    pub sqft: u32,
    #[arg(long = "type", default_value = "house")]
    pub property_type: PropertyType,
    /// Defaults to the current year.
    #[arg(long)]
    pub year_built: Option<i32>,
    #[arg(long, default_value = "draft")]
    pub status: PropertyStatus,
    #[arg(long)]
    pub featured: bool,
    /// Repeat for each amenity.
    #[arg(long = "amenity")]
    pub amenities: Vec<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub beds: Option<u32>,
    #[arg(long)]
    pub baths: Option<f32>,
    #[arg(long)]
    pub sqft: Option<u32>,
    #[arg(long = "type")]
    pub property_type: Option<PropertyType>,
    #[arg(long)]
    pub year_built: Option<i32>,
    #[arg(long)]
    pub status: Option<PropertyStatus>,
    #[arg(long)]
    pub featured: Option<bool>,
    /// Replaces the amenity list; repeat for each amenity.
    #[arg(long = "amenity")]
    pub amenities: Option<Vec<String>>,
}

impl UpdateArgs {
    fn into_update(self) -> (String, PropertyUpdate) {
        let update = PropertyUpdate {
            title: self.title,
            description: self.description,
            location: self.location,
            city: self.city,
            state: self.state,
            price: self.price,
            beds: self.beds,
            baths: self.baths,
            sqft: self.sqft,
            property_type: self.property_type,
            year_built: self.year_built,
            status: self.status,
            featured: self.featured,
            amenities: self.amenities,
        };
        (self.id, update)
    }
}

#[derive(Args, Debug)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum InquiryCommand {
    /// Ask about a listing.
    Submit {
        property_id: String,
        #[command(flatten)]
        contact: ContactArgs,
        #[arg(long)]
        message: String,
    },
    List {
        #[arg(long, default_value = "all")]
        status: StatusFilter<InquiryStatus>,
        #[arg(long)]
        property: Option<String>,
    },
    Show {
        id: String,
    },
    SetStatus {
        id: String,
        status: InquiryStatus,
    },
    Delete {
        id: String,
    },
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum AppointmentCommand {
    /// Request a viewing.
    Book {
        property_id: String,
        #[command(flatten)]
        contact: ContactArgs,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
        /// HH:MM, one of the offered slots
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
    List {
        /// Matches name, email or property title.
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        status: StatusFilter<AppointmentStatus>,
    },
    Show {
        id: String,
    },
    SetStatus {
        id: String,
        status: AppointmentStatus,
    },
    Delete {
        id: String,
    },
    Stats,
}

impl Command {
    /// What the session must allow before the command runs
    pub fn access(&self) -> Access {
        match self {
            Command::Properties(cmd) => cmd.access(),
            Command::Inquiries(cmd) => cmd.access(),
            Command::Appointments(cmd) => cmd.access(),
            Command::Login { .. }
            | Command::Register(_)
            | Command::Logout
            | Command::Whoami
            | Command::Slots => Access::Public,
        }
    }
}

impl PropertyCommand {
    fn access(&self) -> Access {
        match self {
            PropertyCommand::List { .. }
            | PropertyCommand::Filters
            | PropertyCommand::Featured { .. }
            | PropertyCommand::Show { .. } => Access::Public,
            _ => Access::Agent,
        }
    }
}

impl InquiryCommand {
    fn access(&self) -> Access {
        match self {
            InquiryCommand::Submit { .. } => Access::Public,
            _ => Access::Agent,
        }
    }
}

impl AppointmentCommand {
    fn access(&self) -> Access {
        match self {
            AppointmentCommand::Book { .. } => Access::Public,
            _ => Access::Agent,
        }
    }
}

/// A failure that has already been shown to the user
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

pub struct App {
    api: ApiClient,
    session: AuthSession,
    notifier: Arc<dyn Notifier>,
}

impl App {
    pub fn new(config: &Config, store: Arc<dyn SessionStore>, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let api = ApiClient::new(config, store)?;
        Ok(Self::with_client(api, notifier))
    }

    pub fn with_client(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        let auth: Arc<dyn AuthApi> = Arc::new(api.clone());
        let session = AuthSession::new(auth, api.session().clone(), notifier.clone());
        Self {
            api,
            session,
            notifier,
        }
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        self.session.bootstrap().await;
        debug!("Session state: {:?}", self.session.state());
        self.require(command.access())?;

        match command {
            Command::Login { email, password } => self.login(email, password).await,
            Command::Register(args) => self.register(args).await,
            Command::Logout => {
                self.session.logout();
                Ok(())
            }
            Command::Whoami => self.whoami(),
            Command::Properties(cmd) => self.properties(cmd).await,
            Command::Inquiries(cmd) => self.inquiries(cmd).await,
            Command::Appointments(cmd) => self.appointments(cmd).await,
            Command::Slots => {
                for slot in time_slots() {
                    println!("{slot}");
                }
                Ok(())
            }
        }
    }

    fn require(&self, access: Access) -> Result<()> {
        match self.session.guard(access) {
            GuardDecision::Allow => Ok(()),
            GuardDecision::RedirectToLogin | GuardDecision::Wait => Err(self.refuse(
                "Not logged in",
                "Run `estate-portal login` first",
            )),
            GuardDecision::RedirectHome => Err(self.refuse(
                "Access denied",
                "This command is only available to agents",
            )),
        }
    }

    fn refuse(&self, title: &str, description: &str) -> anyhow::Error {
        self.notifier.notify(Notice::error(title, description));
        Reported(format!("{title}: {description}")).into()
    }

    /// Unwrap an API result, turning a failure into a notice.
    fn check<T>(&self, result: ApiResult<T>, title: &str, fallback: &str) -> Result<T> {
        result.map_err(|e| {
            if let ApiError::Status {
                status,
                details: Some(details),
                ..
            } = &e
            {
                debug!("HTTP {} details: {}", status, details);
            }
            // the client has already dropped the cached session
            let notice = if e.is_unauthorized() {
                Notice::error("Session expired", "Please log in again")
            } else {
                Notice::failure(title, &e, fallback)
            };
            let message = format!("{}: {}", notice.title, notice.description);
            self.notifier.notify(notice);
            Reported(message).into()
        })
    }

    fn invalid(&self, errors: FieldErrors) -> anyhow::Error {
        for (field, messages) in errors.fields() {
            for message in messages {
                eprintln!("  {field}: {message}");
            }
        }
        self.refuse("Please fix the highlighted fields", &errors.to_string())
    }

    fn success(&self, title: &str, description: impl Into<String>) {
        self.notifier.notify(Notice::success(title, description));
    }

    async fn login(&mut self, email: String, password: String) -> Result<()> {
        let credentials = LoginForm { email, password }
            .submit()
            .map_err(|e| self.invalid(e))?;
        match self.session.login(&credentials).await {
            Ok(user) => {
                info!("Signed in as {}", user.email);
                Ok(())
            }
            Err(e) => Err(Reported(e.to_string()).into()),
        }
    }

    async fn register(&mut self, args: RegisterArgs) -> Result<()> {
        let form = RegisterForm {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            confirm_password: args.confirm_password.unwrap_or_else(|| args.password.clone()),
            password: args.password,
            phone: args.phone,
            role: args.role,
        };
        let data = form.submit().map_err(|e| self.invalid(e))?;
        match self.session.register(&data).await {
            Ok(_) => Ok(()),
            Err(e) => Err(Reported(e.to_string()).into()),
        }
    }

    fn whoami(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            return Err(self.refuse("Not logged in", "Run `estate-portal login` first"));
        }
        if let Some(user) = self.session.user() {
            println!("{} <{}>", user.full_name(), user.email);
            println!("   Role: {}", user.role);
            if self.session.is_agent() {
                println!("   Agent portal: enabled");
            }
            if let Some(phone) = &user.phone {
                println!("   Phone: {phone}");
            }
        }
        Ok(())
    }

    async fn properties(&mut self, command: PropertyCommand) -> Result<()> {
        match command {
            PropertyCommand::List {
                property_type,
                price,
                beds,
                sort,
                view,
                city,
                state,
                map,
            } => {
                let filters = ListingFilters::parse(&property_type, &price, &beds, &sort)?;
                let query = PropertyQuery {
                    city,
                    state,
                    ..PropertyQuery::active()
                };
                let page = self.check(
                    self.api.list_properties(&query).await,
                    "Error loading properties",
                    "Failed to load properties",
                )?;
                debug!("Fetched {} of {} active listings", page.properties.len(), page.count);
                let shown = filters.apply(&page.properties);

                println!("{}", result_label(shown.len()));
                if filters.active_count() > 0 {
                    println!("   {} filter(s) active, sorted by {}", filters.active_count(), filters.sort.label());
                    if shown.is_empty() {
                        let mut cleared = filters.clone();
                        cleared.clear();
                        let without = cleared.apply(&page.properties).len();
                        println!("   No properties match your filters; {} without them", result_label(without));
                    }
                }
                println!();

                if map {
                    for property in mappable(&shown) {
                        if let (Some(lat), Some(lng)) = (property.latitude, property.longitude) {
                            println!("{:>10.5} {:>11.5}  {} ({})", lat, lng, property.title, format_price(property.price));
                        }
                    }
                    return Ok(());
                }

                for (i, property) in shown.iter().enumerate() {
                    match view {
                        ViewMode::Grid => self.print_card(i + 1, property),
                        ViewMode::List => self.print_detail(property),
                    }
                }
                Ok(())
            }
            PropertyCommand::Filters => {
                let types: Vec<&str> = PropertyType::ALL.iter().map(|t| t.as_str()).collect();
                println!("--type   all, {}", types.join(", "));
                println!("--price  all");
                for range in PRICE_RANGES {
                    println!("         {:<18} {}", range.key, range.label);
                }
                println!("--beds   all, or a minimum number of bedrooms");
                println!("--sort");
                for order in SortOrder::ALL {
                    println!("         {:<18} {}", order.key(), order.label());
                }
                println!("--amenity (create, update)");
                println!("         {}", AMENITIES.join(", "));
                Ok(())
            }
            PropertyCommand::Featured { limit } => {
                let query = PropertyQuery {
                    featured: Some(true),
                    ..PropertyQuery::active()
                };
                let page = self.check(
                    self.api.list_properties(&query).await,
                    "Error loading properties",
                    "Failed to load featured properties",
                )?;
                for (i, property) in featured(&page.properties, limit).into_iter().enumerate() {
                    self.print_card(i + 1, property);
                }
                Ok(())
            }
            PropertyCommand::Show { id } => {
                let property = self.check(
                    self.api.get_property(&id).await,
                    "Error loading property",
                    "Failed to load property",
                )?;
                self.print_detail(&property);
                Ok(())
            }
            PropertyCommand::Mine => {
                let properties = self.check(
                    self.api.my_properties().await,
                    "Error loading properties",
                    "Failed to load your properties",
                )?;
                println!("{}", result_label(properties.len()));
                for (i, property) in properties.iter().enumerate() {
                    self.print_card(i + 1, property);
                }
                Ok(())
            }
            PropertyCommand::Create(args) => {
                let year = forms::current_year(Local::now().date_naive());
                let mut form = PropertyForm::new(year);
                form.title = args.title;
                form.description = args.description;
                form.location = args.location;
                form.city = args.city;
                form.state = args.state;
                form.price = args.price;
                form.beds = args.beds;
                form.baths = args.baths;
                form.sqft = args.sqft;
                form.property_type = args.property_type;
                form.year_built = args.year_built.unwrap_or(year);
                form.status = args.status;
                form.featured = args.featured;
                for amenity in &args.amenities {
                    form.toggle_amenity(amenity);
                }
                let data = form.submit(year).map_err(|e| self.invalid(e))?;

                let property = self.check(
                    self.api.create_property(&data).await,
                    "Error",
                    "Failed to create property",
                )?;
                self.success("Property created", format!("{} has been created", property.title));
                println!("{}", property.id);
                Ok(())
            }
            PropertyCommand::Update(args) => {
                let (id, mut update) = args.into_update();
                update.amenities = update.amenities.as_deref().map(forms::normalize_amenities);
                if update.is_empty() {
                    return Err(self.refuse("Nothing to update", "Pass at least one field to change"));
                }
                let year = forms::current_year(Local::now().date_naive());
                forms::validate_update(&update, year).map_err(|e| self.invalid(e))?;

                let property = self.check(
                    self.api.update_property(&id, &update).await,
                    "Error",
                    "Failed to update property",
                )?;
                self.success("Property updated", format!("{} has been updated", property.title));
                Ok(())
            }
            PropertyCommand::Delete { id } => {
                self.check(
                    self.api.delete_property(&id).await,
                    "Error",
                    "Failed to delete property",
                )?;
                self.success("Property deleted", "The property has been removed");
                Ok(())
            }
            PropertyCommand::UploadImages { id, files } => {
                let mut images = Vec::with_capacity(files.len());
                for path in &files {
                    images.push(ImageFile::read(path).await?);
                }
                let urls = self.check(
                    self.api.upload_images(&id, images).await,
                    "Upload failed",
                    "Failed to upload images",
                )?;
                self.success("Images uploaded", format!("{} image(s) on the listing", urls.len()));
                for url in urls {
                    println!("{}", self.api.image_url(&url));
                }
                Ok(())
            }
            PropertyCommand::DeleteImage { id, image_url } => {
                let remaining = self.check(
                    self.api.delete_image(&id, &image_url).await,
                    "Error",
                    "Failed to delete image",
                )?;
                self.success("Image deleted", format!("{} image(s) left", remaining.len()));
                Ok(())
            }
        }
    }

    async fn inquiries(&mut self, command: InquiryCommand) -> Result<()> {
        match command {
            InquiryCommand::Submit {
                property_id,
                contact,
                message,
            } => {
                let form = InquiryForm {
                    name: contact.name,
                    email: contact.email,
                    phone: contact.phone,
                    message,
                };
                let data = form.submit(&property_id).map_err(|e| self.invalid(e))?;
                self.check(
                    self.api.create_inquiry(&data).await,
                    "Error",
                    "Failed to submit inquiry",
                )?;
                self.success("Inquiry sent!", "An agent will contact you shortly.");
                Ok(())
            }
            InquiryCommand::List { status, property } => {
                let query = inquiry_query(&status, property.as_deref());
                let page = self.check(
                    self.api.list_inquiries(&query).await,
                    "Error",
                    "Failed to load inquiries",
                )?;
                println!("{} inquiries", page.total);
                for inquiry in &page.inquiries {
                    print_inquiry(inquiry);
                }
                Ok(())
            }
            InquiryCommand::Show { id } => {
                let inquiry = self.check(
                    self.api.get_inquiry(&id).await,
                    "Error",
                    "Failed to load inquiry",
                )?;
                print_inquiry(&inquiry);
                println!("   {}", inquiry.message);
                Ok(())
            }
            InquiryCommand::SetStatus { id, status } => {
                self.check(
                    self.api.update_inquiry_status(&id, status).await,
                    "Error",
                    "Failed to update status",
                )?;
                self.success("Status updated", format!("Inquiry marked as {}", status.label()));
                Ok(())
            }
            InquiryCommand::Delete { id } => {
                self.check(
                    self.api.delete_inquiry(&id).await,
                    "Error",
                    "Failed to delete inquiry",
                )?;
                self.success("Inquiry deleted", "The inquiry has been removed");
                Ok(())
            }
            InquiryCommand::Stats => {
                let stats = self.check(
                    self.api.inquiry_stats().await,
                    "Error",
                    "Failed to load inquiry stats",
                )?;
                println!("Total:     {}", stats.total);
                println!("New:       {}", stats.new);
                println!("Contacted: {}", stats.contacted);
                println!("Scheduled: {}", stats.scheduled);
                println!("Closed:    {}", stats.closed);
                Ok(())
            }
        }
    }

    async fn appointments(&mut self, command: AppointmentCommand) -> Result<()> {
        match command {
            AppointmentCommand::Book {
                property_id,
                contact,
                date,
                time,
                message,
            } => {
                let form = AppointmentForm {
                    name: contact.name,
                    email: contact.email,
                    phone: contact.phone,
                    preferred_date: date,
                    preferred_time: time,
                    message,
                };
                let request = form
                    .submit(&property_id, Local::now().date_naive())
                    .map_err(|e| self.invalid(e))?;
                self.check(
                    self.api.create_appointment(&request).await,
                    "Error",
                    "Failed to submit appointment request",
                )?;
                self.success(
                    "Appointment requested!",
                    format!(
                        "We'll confirm your viewing on {} at {}.",
                        request.preferred_date, request.preferred_time
                    ),
                );
                Ok(())
            }
            AppointmentCommand::List { search, status } => {
                let appointments = self.check(
                    self.api.list_appointments(&StatusQuery::default()).await,
                    "Error",
                    "Failed to load appointments",
                )?;
                let filter = AppointmentFilter::new(search, status);
                let shown = filter.apply(&appointments);
                println!("{} of {} appointments", shown.len(), appointments.len());
                for appointment in shown {
                    print_appointment(appointment);
                }
                Ok(())
            }
            AppointmentCommand::Show { id } => {
                let appointment = self.check(
                    self.api.get_appointment(&id).await,
                    "Error",
                    "Failed to load appointment",
                )?;
                print_appointment(&appointment);
                if let Some(message) = &appointment.message {
                    println!("   {message}");
                }
                Ok(())
            }
            AppointmentCommand::SetStatus { id, status } => {
                self.check(
                    self.api.update_appointment_status(&id, status).await,
                    "Error",
                    "Failed to update status",
                )?;
                self.success("Status updated", format!("Appointment marked as {}", status.label()));
                Ok(())
            }
            AppointmentCommand::Delete { id } => {
                self.check(
                    self.api.delete_appointment(&id).await,
                    "Error",
                    "Failed to delete appointment",
                )?;
                self.success("Appointment deleted", "The appointment has been removed");
                Ok(())
            }
            AppointmentCommand::Stats => {
                let stats = self.check(
                    self.api.appointment_stats().await,
                    "Error",
                    "Failed to load appointment stats",
                )?;
                println!("Total:     {}", stats.total);
                println!("Pending:   {}", stats.pending);
                println!("Confirmed: {}", stats.confirmed);
                println!("Cancelled: {}", stats.cancelled);
                println!("Completed: {}", stats.completed);
                println!("Upcoming:  {}", stats.upcoming);
                Ok(())
            }
        }
    }

    fn print_card(&self, index: usize, property: &Property) {
        println!("{}. {} ({})", index, property.title, format_price(property.price));
        println!("   {} · {} beds, {} baths, {} sqft", property.display_location(), property.beds, property.baths, property.sqft);
        println!("   ID: {}", property.id);
    }

    fn print_detail(&self, property: &Property) {
        println!("{}{}", property.title, if property.featured { " ★" } else { "" });
        println!("   Price:    {}", format_price(property.price));
        println!("   Location: {}, {}", property.location, property.display_location());
        println!("   Type:     {} ({})", property.property_type, property.status);
        println!("   Size:     {} beds, {} baths, {} sqft", property.beds, property.baths, property.sqft);
        println!("   Built:    {}", property.year_built);
        if !property.amenities.is_empty() {
            println!("   Amenities: {}", property.amenities.join(", "));
        }
        println!("   Image:    {}", thumbnail(property, &self.api));
        if let Some(agent) = &property.agent {
            println!("   Agent:    {} {} <{}>", agent.first_name, agent.last_name, agent.email);
        }
        if let Some(description) = &property.description {
            println!("   {description}");
        }
        println!("   ID: {}", property.id);
        println!();
    }
}

fn print_inquiry(inquiry: &Inquiry) {
    println!(
        "[{}] {} <{}> on {}",
        inquiry.status.label(),
        inquiry.name,
        inquiry.email,
        inquiry.property_title.as_deref().unwrap_or(&inquiry.property_id)
    );
    println!("   {} · {}", inquiry.created_at.format("%Y-%m-%d %H:%M"), inquiry.id);
}

fn print_appointment(appointment: &Appointment) {
    println!(
        "[{}] {} {} · {} <{}>",
        appointment.status.label(),
        appointment.preferred_date,
        appointment.preferred_time,
        appointment.name,
        appointment.email
    );
    println!(
        "   {} · {}",
        appointment.property_title.as_deref().unwrap_or(&appointment.property_id),
        appointment.id
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::RawQuery;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::api::stub::{serve, Seen};
    use crate::listing::Choice;
    use crate::notify::{RecordingNotifier, Variant};
    use crate::session::{test_user, MemorySessionStore};

    fn user_json(role: &str) -> Value {
        serde_json::to_value(test_user(role)).unwrap()
    }

    async fn app(router: Router, store: MemorySessionStore) -> (App, Arc<RecordingNotifier>) {
        let api = serve(router, Arc::new(store)).await;
        let notifier = Arc::new(RecordingNotifier::new());
        (App::with_client(api, notifier.clone()), notifier)
    }

    #[test]
    fn parses_listing_flags() {
        let cli = Cli::try_parse_from([
            "estate-portal",
            "--ephemeral",
            "properties",
            "list",
            "--type",
            "villa",
            "--price",
            "1000000-2500000",
            "--beds",
            "3",
            "--sort",
            "price-low",
            "--view",
            "list",
        ])
        .unwrap();
        assert!(cli.ephemeral);
        match cli.command {
            Command::Properties(PropertyCommand::List { property_type, view, .. }) => {
                assert_eq!(property_type, "villa");
                assert_eq!(view, ViewMode::List);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_status_filters() {
        let cli = Cli::try_parse_from(["estate-portal", "inquiries", "list", "--status", "contacted"]).unwrap();
        match cli.command {
            Command::Inquiries(InquiryCommand::List { status, .. }) => {
                assert_eq!(status, Choice::Only(InquiryStatus::Contacted));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["estate-portal", "inquiries", "list", "--status", "lost"]).is_err());
    }

    #[test]
    fn overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "estate-portal",
            "--api-url",
            "https://homes.example.com/api",
            "--log-level",
            "debug",
            "slots",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.api_url, "https://homes.example.com/api");
        assert_eq!(config.log_level, "debug");
    }

    #[tokio::test]
    async fn agent_commands_need_a_session() {
        let (mut app, notifier) = app(Router::new(), MemorySessionStore::new()).await;

        let err = app.run(Command::Inquiries(InquiryCommand::Stats)).await.unwrap_err();
        assert!(err.downcast_ref::<Reported>().is_some());
        let notices = notifier.notices();
        assert_eq!(notices[0].title, "Not logged in");
        assert_eq!(notices[0].variant, Variant::Destructive);
    }

    #[tokio::test]
    async fn plain_users_are_turned_away_from_agent_commands() {
        let router = Router::new().route("/auth/me", get(|| async { Json(json!({ "user": user_json("user") })) }));
        let store = MemorySessionStore::with_session("tok", test_user("user"));
        let (mut app, notifier) = app(router, store).await;

        let err = app.run(Command::Properties(PropertyCommand::Mine)).await;
        assert!(err.is_err());
        assert_eq!(notifier.notices()[0].title, "Access denied");
    }

    #[tokio::test]
    async fn invalid_inquiry_is_never_sent() {
        let seen = Seen::default();
        let hits = seen.clone();
        let router = Router::new().route(
            "/inquiries",
            post(move || {
                let hits = hits.clone();
                async move {
                    hits.push("POST /inquiries");
                    Json(json!({}))
                }
            }),
        );
        let (mut app, _) = app(router, MemorySessionStore::new()).await;

        let command = Command::Inquiries(InquiryCommand::Submit {
            property_id: "p-1".into(),
            contact: ContactArgs {
                name: "J".into(),
                email: "jane@example.com".into(),
                phone: None,
            },
            message: "Hello there, is it available?".into(),
        });
        assert!(app.run(command).await.is_err());
        assert!(seen.entries().is_empty());
    }

    #[tokio::test]
    async fn server_failures_become_notices() {
        let router = Router::new()
            .route("/auth/me", get(|| async { Json(json!({ "user": user_json("agent") })) }))
            .route(
                "/appointments/stats",
                get(|| async {
                    (
                        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Database unavailable" })),
                    )
                }),
            );
        let store = MemorySessionStore::with_session("tok", test_user("agent"));
        let (mut app, notifier) = app(router, store).await;

        let err = app.run(Command::Appointments(AppointmentCommand::Stats)).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: Database unavailable");
        let notices = notifier.notices();
        assert_eq!(notices.last().map(|n| n.description.as_str()), Some("Database unavailable"));
    }

    fn list_all() -> Command {
        Command::Properties(PropertyCommand::List {
            property_type: "all".into(),
            price: "all".into(),
            beds: "all".into(),
            sort: "featured".into(),
            view: ViewMode::Grid,
            city: None,
            state: None,
            map: false,
        })
    }

    #[tokio::test]
    async fn public_listing_asks_for_active_listings_only() {
        let seen = Seen::default();
        let queries = seen.clone();
        let router = Router::new().route(
            "/properties",
            get(move |RawQuery(query): RawQuery| {
                let queries = queries.clone();
                async move {
                    queries.push(query.unwrap_or_default());
                    Json(json!({ "properties": [], "count": 0 }))
                }
            }),
        );
        let (mut app, _) = app(router, MemorySessionStore::new()).await;

        app.run(list_all()).await.unwrap();
        assert_eq!(seen.entries(), vec!["status=active".to_string()]);
    }

    #[tokio::test]
    async fn rejected_token_reports_expired_session() {
        let router = Router::new()
            .route("/auth/me", get(|| async { Json(json!({ "user": user_json("agent") })) }))
            .route(
                "/inquiries/stats",
                get(|| async {
                    (
                        axum::http::StatusCode::UNAUTHORIZED,
                        Json(json!({ "error": "Token expired" })),
                    )
                }),
            );
        let store = MemorySessionStore::with_session("tok", test_user("agent"));
        let (mut app, notifier) = app(router, store).await;

        assert!(app.run(Command::Inquiries(InquiryCommand::Stats)).await.is_err());
        let last = notifier.notices().pop().unwrap();
        assert_eq!(last.title, "Session expired");
        assert!(app.api.session().token().is_none());
    }

    #[test]
    fn commands_map_to_access_levels() {
        assert_eq!(list_all().access(), Access::Public);
        assert_eq!(Command::Slots.access(), Access::Public);
        assert_eq!(Command::Properties(PropertyCommand::Mine).access(), Access::Agent);
        assert_eq!(Command::Inquiries(InquiryCommand::Stats).access(), Access::Agent);
        let book = Command::Appointments(AppointmentCommand::Book {
            property_id: "p-1".into(),
            contact: ContactArgs {
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                phone: None,
            },
            date: None,
            time: None,
            message: None,
        });
        assert_eq!(book.access(), Access::Public);
    }

    #[tokio::test]
    async fn whoami_requires_a_session() {
        let (mut app, notifier) = app(Router::new(), MemorySessionStore::new()).await;
        assert!(app.run(Command::Whoami).await.is_err());
        assert_eq!(notifier.notices()[0].title, "Not logged in");
    }
}
